//! Scenes and the entity groups they hand to each other.

mod flying;
mod game_over;
mod start;

pub use flying::Flying;
pub use game_over::GameOver;
pub use start::StartScreen;

use std::fmt;

use log::debug;

use crate::audio::{Audio, Sound};
use crate::entity::{Bird, Button, Entity, Girl, PipeGroup, Road, ScoreText, TextSprite};
use crate::error::GameError;
use crate::gfx::Surface;
use crate::input::{InputEvent, InputState, MouseButton, Outbox};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SceneId {
    Start,
    Flying,
    GameOver,
}

impl fmt::Display for SceneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SceneId::Start => "start",
            SceneId::Flying => "flying",
            SceneId::GameOver => "game_over",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GroupKey {
    Bird,
    Pipes,
    Road,
    Score,
    Text,
    Buttons,
    Girl,
    RestartButton,
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            GroupKey::Bird => "bird",
            GroupKey::Pipes => "pipes",
            GroupKey::Road => "road",
            GroupKey::Score => "score",
            GroupKey::Text => "text",
            GroupKey::Buttons => "buttons",
            GroupKey::Girl => "girl",
            GroupKey::RestartButton => "restart_button",
        })
    }
}

// ── Groups ──────────────────────────────────────────────────────────────────

pub enum Group {
    Bird(Bird),
    Pipes(PipeGroup),
    Road(Road),
    Score(ScoreText),
    Text(Vec<TextSprite>),
    Buttons(Vec<Button>),
    Girl(Girl),
}

impl Group {
    fn kind(&self) -> &'static str {
        match self {
            Group::Bird(_) => "bird",
            Group::Pipes(_) => "pipes",
            Group::Road(_) => "road",
            Group::Score(_) => "score",
            Group::Text(_) => "text",
            Group::Buttons(_) => "buttons",
            Group::Girl(_) => "girl",
        }
    }

    fn update(&mut self, ctx: &mut FrameCtx<'_>) {
        match self {
            Group::Bird(bird) => {
                if bird.update(ctx.input.is_held(MouseButton::Left)) {
                    ctx.audio.play(Sound::Jump);
                }
            }
            Group::Pipes(pipes) => pipes.update(None),
            Group::Buttons(buttons) => {
                for button in buttons {
                    button.poll(ctx.input, ctx.now_ms, ctx.outbox);
                }
            }
            Group::Road(_) | Group::Score(_) | Group::Text(_) | Group::Girl(_) => {}
        }
    }

    fn draw(&self, surface: &mut dyn Surface) {
        match self {
            Group::Bird(bird) => bird.draw(surface),
            Group::Pipes(pipes) => pipes.draw(surface),
            Group::Road(road) => road.draw(surface),
            Group::Score(score) => score.draw(surface),
            Group::Text(texts) => texts.iter().for_each(|t| t.draw(surface)),
            Group::Buttons(buttons) => buttons.iter().for_each(|b| b.draw(surface)),
            Group::Girl(girl) => girl.draw(surface),
        }
    }
}

/// Named groups in insertion order, which is also the draw order.
///
/// Inserting under an existing key replaces the group in place; a new key
/// goes to the end.
#[derive(Default)]
pub struct Groups {
    entries: Vec<(GroupKey, Group)>,
}

impl Groups {
    pub fn new() -> Self {
        Self::default()
    }

    fn position(&self, key: GroupKey) -> Option<usize> {
        self.entries.iter().position(|(k, _)| *k == key)
    }

    pub fn insert(&mut self, key: GroupKey, group: Group) {
        match self.position(key) {
            Some(i) => self.entries[i].1 = group,
            None => self.entries.push((key, group)),
        }
    }

    pub fn get(&self, key: GroupKey) -> Option<&Group> {
        self.entries.iter().find(|(k, _)| *k == key).map(|(_, g)| g)
    }

    pub fn get_mut(&mut self, key: GroupKey) -> Option<&mut Group> {
        self.entries
            .iter_mut()
            .find(|(k, _)| *k == key)
            .map(|(_, g)| g)
    }

    pub fn take(&mut self, key: GroupKey) -> Option<Group> {
        self.position(key).map(|i| self.entries.remove(i).1)
    }

    pub fn contains(&self, key: GroupKey) -> bool {
        self.position(key).is_some()
    }

    pub fn move_to_end(&mut self, key: GroupKey) {
        if let Some(i) = self.position(key) {
            let entry = self.entries.remove(i);
            self.entries.push(entry);
        }
    }

    pub fn keys(&self) -> Vec<GroupKey> {
        self.entries.iter().map(|(k, _)| *k).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Fails when any of `keys` is missing, before anything is moved.
    pub fn require(&self, keys: &[GroupKey], scene: SceneId) -> Result<(), GameError> {
        match keys.iter().find(|k| !self.contains(**k)) {
            Some(&group) => Err(GameError::MissingGroup { scene, group }),
            None => Ok(()),
        }
    }

    /// Moves the named groups out of `from` into `self`, in the order given.
    pub fn absorb(&mut self, from: &mut Groups, keys: &[GroupKey], scene: SceneId) -> Result<(), GameError> {
        from.require(keys, scene)?;
        for &key in keys {
            if let Some(group) = from.take(key) {
                self.insert(key, group);
            }
        }
        debug!("{scene} absorbed {keys:?}");
        Ok(())
    }

    /// Moves the named groups out into a fresh hand-off, skipping absent ones.
    pub fn hand_over(&mut self, keys: &[GroupKey]) -> Groups {
        let mut out = Groups::new();
        for &key in keys {
            if let Some(group) = self.take(key) {
                out.insert(key, group);
            }
        }
        out
    }

    pub fn bird(&self) -> Option<&Bird> {
        match self.get(GroupKey::Bird) {
            Some(Group::Bird(bird)) => Some(bird),
            _ => None,
        }
    }

    pub fn bird_mut(&mut self) -> Option<&mut Bird> {
        match self.get_mut(GroupKey::Bird) {
            Some(Group::Bird(bird)) => Some(bird),
            _ => None,
        }
    }

    pub fn pipes(&self) -> Option<&PipeGroup> {
        match self.get(GroupKey::Pipes) {
            Some(Group::Pipes(pipes)) => Some(pipes),
            _ => None,
        }
    }

    pub fn pipes_mut(&mut self) -> Option<&mut PipeGroup> {
        match self.get_mut(GroupKey::Pipes) {
            Some(Group::Pipes(pipes)) => Some(pipes),
            _ => None,
        }
    }

    pub fn road_mut(&mut self) -> Option<&mut Road> {
        match self.get_mut(GroupKey::Road) {
            Some(Group::Road(road)) => Some(road),
            _ => None,
        }
    }

    pub fn score(&self) -> Option<&ScoreText> {
        match self.get(GroupKey::Score) {
            Some(Group::Score(score)) => Some(score),
            _ => None,
        }
    }

    pub fn score_mut(&mut self) -> Option<&mut ScoreText> {
        match self.get_mut(GroupKey::Score) {
            Some(Group::Score(score)) => Some(score),
            _ => None,
        }
    }

    pub fn buttons(&self, key: GroupKey) -> &[Button] {
        match self.get(key) {
            Some(Group::Buttons(buttons)) => buttons,
            _ => &[],
        }
    }

    pub fn buttons_mut(&mut self, key: GroupKey) -> &mut [Button] {
        match self.get_mut(key) {
            Some(Group::Buttons(buttons)) => buttons,
            _ => &mut [],
        }
    }

    pub fn update_all(&mut self, ctx: &mut FrameCtx<'_>) {
        for (_, group) in &mut self.entries {
            group.update(ctx);
        }
    }

    pub fn draw_all(&self, surface: &mut dyn Surface) {
        for (_, group) in &self.entries {
            group.draw(surface);
        }
    }
}

impl fmt::Debug for Groups {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.entries.iter().map(|(k, g)| (k, g.kind())))
            .finish()
    }
}

// ── Scene contract ──────────────────────────────────────────────────────────

/// State every scene carries.
#[derive(Debug)]
pub struct SceneBase {
    pub done: bool,
    pub next: Option<SceneId>,
    pub groups: Groups,
}

impl SceneBase {
    pub fn new(next: Option<SceneId>) -> Self {
        Self {
            done: false,
            next,
            groups: Groups::new(),
        }
    }
}

/// Per-frame services lent to the active scene.
pub struct FrameCtx<'a> {
    pub input: &'a InputState,
    pub audio: &'a mut dyn Audio,
    pub outbox: &'a mut Outbox,
    /// Milliseconds since the machine started.
    pub now_ms: u64,
    pub dt_ms: u64,
}

pub trait Scene {
    fn id(&self) -> SceneId;
    fn base(&self) -> &SceneBase;
    fn base_mut(&mut self) -> &mut SceneBase;

    fn handle_event(&mut self, _event: &InputEvent, _ctx: &mut FrameCtx<'_>) -> Result<(), GameError> {
        Ok(())
    }

    fn update(&mut self, ctx: &mut FrameCtx<'_>) -> Result<(), GameError> {
        self.base_mut().groups.update_all(ctx);
        Ok(())
    }

    fn draw(&self, surface: &mut dyn Surface) {
        self.base().groups.draw_all(surface);
    }

    /// Takes ownership of the groups handed over by the previous scene.
    fn on_enter(&mut self, handoff: Groups) -> Result<(), GameError>;

    /// Gives up the groups the next scene carries on with.
    fn on_exit(&mut self) -> Groups;

    fn is_done(&self) -> bool {
        self.base().done
    }

    fn next_scene(&self) -> Option<SceneId> {
        self.base().next
    }

    fn clear_done(&mut self) {
        self.base_mut().done = false;
    }

    fn groups(&self) -> &Groups {
        &self.base().groups
    }
}
