use std::rc::Rc;

use log::{debug, info, trace};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::{FrameCtx, Group, GroupKey, Groups, Scene, SceneBase, SceneId};
use crate::assets::Assets;
use crate::audio::Sound;
use crate::config::{Config, FlyingConfig};
use crate::entity::{Entity, Orientation, Pipe, PipeCommand, PipeGroup, PipeId, ScoreText};
use crate::error::GameError;
use crate::gfx::{Align, Font, Sprite, TextStyle};

/// One flight: the bird falls, pipes stream in, the score counts pipes passed.
pub struct Flying {
    base: SceneBase,
    rules: FlyingConfig,
    screen: (f32, f32),
    pipe_up: Rc<Sprite>,
    pipe_down: Rc<Sprite>,
    score_style: TextStyle,
    score: u32,
    game_over: bool,
    road_scroll: f32,
    last_spawn_ms: Option<u64>,
    last_credited: Option<PipeId>,
    next_pipe_id: PipeId,
    rng: StdRng,
}

impl Flying {
    /// `seed` pins the pipe layout; without it the layout comes from entropy.
    pub fn new(cfg: &Config, assets: &Assets, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let mut scene = Self {
            base: SceneBase::new(Some(SceneId::GameOver)),
            rules: cfg.flying.clone(),
            screen: cfg.screen_size(),
            pipe_up: assets.pipe_up.clone(),
            pipe_down: assets.pipe_down.clone(),
            score_style: TextStyle {
                font: Font::Score {
                    scale: cfg.fonts.score_scale,
                },
                color: cfg.fonts.color.into(),
                align: Align::Center,
            },
            score: 0,
            game_over: false,
            road_scroll: 0.0,
            last_spawn_ms: None,
            last_credited: None,
            next_pipe_id: 0,
            rng,
        };
        scene.reset_own_groups();
        scene
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn is_game_over(&self) -> bool {
        self.game_over
    }

    fn reset_own_groups(&mut self) {
        let score = ScoreText::new((self.screen.0 / 2.0, 12.0), self.score_style);
        self.base.groups.insert(GroupKey::Pipes, Group::Pipes(PipeGroup::new()));
        self.base.groups.insert(GroupKey::Score, Group::Score(score));
    }

    fn spawn_pair(&mut self, x: f32, center_y: f32) {
        let anchor = (x, center_y);
        let (gap, speed, bob) = (self.rules.pipe_gap, self.rules.scroll_speed, self.rules.bob_frames);
        let down = Pipe::new(self.next_pipe_id, anchor, Orientation::Down, gap, speed, self.pipe_down.clone())
            .with_bob_frames(bob);
        let up = Pipe::new(self.next_pipe_id + 1, anchor, Orientation::Up, gap, speed, self.pipe_up.clone())
            .with_bob_frames(bob);
        self.next_pipe_id += 2;
        trace!("pipe pair spawned at {anchor:?}");
        if let Some(pipes) = self.base.groups.pipes_mut() {
            pipes.push(down);
            pipes.push(up);
        }
    }

    fn credit_passed_pipe(&mut self) {
        let groups = &self.base.groups;
        let (Some(bird), Some(lead)) = (groups.bird(), groups.pipes().and_then(PipeGroup::lead)) else {
            return;
        };
        if self.last_credited != Some(lead.id()) && bird.rect().left() > lead.rect().right() {
            self.last_credited = Some(lead.id());
            self.score += 1;
            debug!("score {}", self.score);
        }
    }

    fn check_death(&mut self, ctx: &mut FrameCtx<'_>) {
        let groups = &self.base.groups;
        let Some(bird) = groups.bird() else {
            return;
        };
        let rect = bird.rect();
        let hit_pipe = groups
            .pipes()
            .is_some_and(|pipes| pipes.iter().any(|p| p.rect().overlaps(&rect)));
        let hit_ceiling = rect.top() < 0.0;
        let hit_floor = rect.bottom() >= self.rules.floor_y;

        if !(hit_pipe || hit_ceiling || hit_floor) {
            return;
        }
        if !self.game_over {
            info!("bird down with score {} (pipe: {hit_pipe}, ceiling: {hit_ceiling}, floor: {hit_floor})", self.score);
            ctx.audio.play(Sound::Hit);
        }
        self.game_over = true;
        self.base.done = true;
        if let Some(bird) = self.base.groups.bird_mut() {
            bird.visible = false;
            if hit_floor {
                bird.flying = false;
            }
        }
    }

    fn spawn_and_scroll(&mut self, now_ms: u64) {
        let due = self
            .last_spawn_ms
            .is_none_or(|last| now_ms.saturating_sub(last) > self.rules.pipe_freq_ms);
        if due {
            let offset = self.rules.pipe_offset;
            let shift = self.rng.gen_range(-offset..=offset) as f32;
            let center_y = (self.screen.1 / 2.0 + shift).round();
            self.spawn_pair(self.screen.0, center_y);
            self.last_spawn_ms = Some(now_ms);
        }

        self.road_scroll -= self.rules.scroll_speed;
        if self.road_scroll.abs() > self.rules.road_tile_width {
            self.road_scroll = 0.0;
        }
        if let Some(road) = self.base.groups.road_mut() {
            road.set_scroll(self.road_scroll);
        }
    }
}

impl Scene for Flying {
    fn id(&self) -> SceneId {
        SceneId::Flying
    }

    fn base(&self) -> &SceneBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut SceneBase {
        &mut self.base
    }

    fn update(&mut self, ctx: &mut FrameCtx<'_>) -> Result<(), GameError> {
        // Entities move first so the checks see this frame's rects.
        self.base.groups.update_all(ctx);

        self.credit_passed_pipe();
        let score = self.score;
        if let Some(text) = self.base.groups.score_mut() {
            text.set(score);
        }

        self.check_death(ctx);

        let flying = self.base.groups.bird().is_some_and(|b| b.flying);
        if !self.game_over && flying {
            self.spawn_and_scroll(ctx.now_ms);
        }
        Ok(())
    }

    fn on_enter(&mut self, mut handoff: Groups) -> Result<(), GameError> {
        handoff.require(&[GroupKey::Bird, GroupKey::Road], SceneId::Flying)?;
        self.score = 0;
        self.game_over = false;
        self.road_scroll = 0.0;
        self.last_spawn_ms = None;
        self.last_credited = None;

        self.reset_own_groups();
        self.base
            .groups
            .absorb(&mut handoff, &[GroupKey::Bird, GroupKey::Road], SceneId::Flying)?;
        if let Some(bird) = self.base.groups.bird_mut() {
            bird.flying = true;
        }
        let speed = self.rules.scroll_speed;
        if let Some(pipes) = self.base.groups.pipes_mut() {
            pipes.update(Some(PipeCommand::SetScrollSpeed(speed)));
        }
        debug!("flying entered with {:?}", self.base.groups);
        Ok(())
    }

    fn on_exit(&mut self) -> Groups {
        self.base.groups.hand_over(&[
            GroupKey::Pipes,
            GroupKey::Score,
            GroupKey::Bird,
            GroupKey::Road,
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::Silent;
    use crate::entity::{Bird, BirdPhysics, Road};
    use crate::input::{InputState, MouseButton, Outbox};

    struct Rig {
        scene: Flying,
        input: InputState,
        audio: Silent,
        outbox: Outbox,
        now_ms: u64,
    }

    impl Rig {
        fn new() -> Self {
            let cfg = Config::default();
            let assets = Assets::build(&cfg).unwrap();
            let mut scene = Flying::new(&cfg, &assets, Some(7));
            let mut handoff = Groups::new();
            let bird = Bird::new(
                (50.0, 234.0),
                (50.0, 35.0),
                assets.bird_frames.clone(),
                BirdPhysics::default(),
            );
            handoff.insert(GroupKey::Bird, Group::Bird(bird));
            handoff.insert(GroupKey::Road, Group::Road(Road::new(assets.road.clone(), 384.0)));
            scene.on_enter(handoff).unwrap();
            Self {
                scene,
                input: InputState::default(),
                audio: Silent::default(),
                outbox: Outbox::default(),
                now_ms: 0,
            }
        }

        fn step(&mut self) {
            self.now_ms += 16;
            let mut ctx = FrameCtx {
                input: &self.input,
                audio: &mut self.audio,
                outbox: &mut self.outbox,
                now_ms: self.now_ms,
                dt_ms: 16,
            };
            self.scene.update(&mut ctx).unwrap();
        }

        fn ground_bird(&mut self) {
            if let Some(bird) = self.scene.base.groups.bird_mut() {
                bird.flying = false;
            }
        }
    }

    #[test]
    fn entry_resets_session_and_arms_the_bird() {
        let rig = Rig::new();
        let groups = rig.scene.groups();
        assert_eq!(
            groups.keys(),
            vec![GroupKey::Pipes, GroupKey::Score, GroupKey::Bird, GroupKey::Road]
        );
        assert!(groups.bird().unwrap().flying);
        assert!(groups.pipes().unwrap().is_empty());
        assert_eq!(groups.score().unwrap().value(), 0);
        assert!(!rig.scene.is_game_over());
    }

    #[test]
    fn entry_without_road_fails() {
        let cfg = Config::default();
        let assets = Assets::build(&cfg).unwrap();
        let mut scene = Flying::new(&cfg, &assets, Some(1));
        let err = scene.on_enter(Groups::new()).unwrap_err();
        assert!(matches!(err, GameError::MissingGroup { scene: SceneId::Flying, .. }));
    }

    #[test]
    fn score_counts_a_pair_only_once_it_is_fully_passed() {
        let mut rig = Rig::new();
        rig.ground_bird();
        rig.scene.spawn_pair(432.0, 234.0);
        // right edge 484, bird left edge 25, 2 px per frame
        for _ in 0..229 {
            rig.step();
        }
        assert_eq!(rig.scene.score(), 0);
        rig.step();
        assert_eq!(rig.scene.score(), 1);
        assert_eq!(rig.scene.groups().score().unwrap().text(), "1");
        for _ in 0..30 {
            rig.step();
        }
        assert_eq!(rig.scene.score(), 1);
        assert!(!rig.scene.is_done());
    }

    #[test]
    fn score_never_decreases() {
        let mut rig = Rig::new();
        rig.ground_bird();
        let mut last = 0;
        for i in 0..600 {
            if i % 100 == 0 {
                rig.scene.spawn_pair(432.0, 234.0);
            }
            rig.step();
            assert!(rig.scene.score() >= last);
            last = rig.scene.score();
        }
        assert!(last >= 3);
    }

    #[test]
    fn first_frame_spawns_a_pair_inside_the_offset_band() {
        let mut rig = Rig::new();
        rig.step();
        let pipes = rig.scene.groups().pipes().unwrap();
        assert_eq!(pipes.len(), 2);
        let down = pipes.iter().find(|p| p.orientation() == Orientation::Down).unwrap();
        let up = pipes.iter().find(|p| p.orientation() == Orientation::Up).unwrap();
        assert_eq!(up.rect().top() - down.rect().bottom(), 100.0);
        let center = (up.rect().top() + down.rect().bottom()) / 2.0;
        assert!((184.0..=284.0).contains(&center));
    }

    #[test]
    fn pipes_follow_the_spawn_frequency() {
        let mut rig = Rig::new();
        rig.input.mouse = (0.0, 0.0);
        // 60 frames is under 1250 ms: still a single pair
        for i in 0..60 {
            // keep the bird airborne
            rig.input.set_held(MouseButton::Left, i % 20 == 0);
            rig.step();
        }
        assert_eq!(rig.scene.groups().pipes().unwrap().len(), 2);
    }

    #[test]
    fn falling_to_the_floor_ends_the_flight() {
        let mut rig = Rig::new();
        let mut frames = 0;
        while !rig.scene.is_done() {
            rig.step();
            frames += 1;
            assert!(frames < 1000);
        }
        let bird = rig.scene.groups().bird().unwrap();
        assert!(!bird.visible);
        assert!(!bird.flying);
        assert!(rig.scene.is_game_over());
        assert_eq!(rig.scene.next_scene(), Some(SceneId::GameOver));
    }

    #[test]
    fn hitting_a_pipe_keeps_the_bird_flying() {
        let mut rig = Rig::new();
        // gap far below the bird
        rig.scene.spawn_pair(60.0, 400.0);
        rig.step();
        assert!(rig.scene.is_done());
        let bird = rig.scene.groups().bird().unwrap();
        assert!(!bird.visible);
        assert!(bird.flying);
        // no new pair once the flight is over
        assert_eq!(rig.scene.groups().pipes().unwrap().len(), 2);
    }

    #[test]
    fn leaving_through_the_top_ends_the_flight() {
        let mut rig = Rig::new();
        // top edge half a pixel above the screen
        if let Some(bird) = rig.scene.base.groups.bird_mut() {
            bird.move_to((50.0, 17.0));
        }
        rig.step();
        assert!(rig.scene.is_done());
        assert!(rig.scene.is_game_over());
        let bird = rig.scene.groups().bird().unwrap();
        assert!(bird.rect().top() < 0.0);
        assert!(!bird.visible);
        assert!(bird.flying);
        assert!(rig.scene.groups().pipes().unwrap().is_empty());
    }

    #[test]
    fn road_wraps_after_a_tile() {
        let mut rig = Rig::new();
        rig.input.mouse = (0.0, 0.0);
        let mut seen = Vec::new();
        for i in 0..10 {
            rig.input.set_held(MouseButton::Left, i % 2 == 0);
            rig.step();
            seen.push(rig.scene.road_scroll);
        }
        assert_eq!(&seen[..9], &[-2.0, -4.0, -6.0, -8.0, -10.0, -12.0, -14.0, -16.0, 0.0]);
    }

    #[test]
    fn reentry_starts_from_scratch() {
        let mut rig = Rig::new();
        rig.ground_bird();
        rig.scene.spawn_pair(432.0, 234.0);
        for _ in 0..240 {
            rig.step();
        }
        assert_eq!(rig.scene.score(), 1);
        let handoff = rig.scene.on_exit();
        assert!(rig.scene.groups().is_empty());
        rig.scene.on_enter(handoff).unwrap();
        assert_eq!(rig.scene.score(), 0);
        assert!(rig.scene.groups().pipes().unwrap().is_empty());
        assert_eq!(rig.scene.groups().score().unwrap().text(), "0");
    }
}
