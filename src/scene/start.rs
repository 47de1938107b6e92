use log::{debug, info};

use super::{FrameCtx, Group, GroupKey, Groups, Scene, SceneBase, SceneId};
use crate::assets::{Assets, BUTTON_SIZE, MUSIC_BUTTON_SIZE};
use crate::config::Config;
use crate::entity::{Bird, BirdPhysics, Button, ButtonAction, Entity, Road, TextSprite};
use crate::error::GameError;
use crate::gfx::{Align, Font, TextStyle, WHITE};
use crate::input::{GameEvent, InputEvent, Key, MouseButton};
use crate::skin::{EditOutcome, SkinEditor};

const INSTRUCTIONS: [&str; 3] = [
    "click, space or enter to start flying",
    "SKIN repaints the bird, REDRESS undoes it",
    "tap to flap, m toggles the music, q quits",
];

/// The title screen: idle bird, instructions and the menu buttons.
pub struct StartScreen {
    base: SceneBase,
    skins: Box<dyn SkinEditor>,
}

impl StartScreen {
    pub fn new(cfg: &Config, assets: &Assets, skins: Box<dyn SkinEditor>) -> Self {
        let (w, h) = cfg.screen_size();
        let text_style = TextStyle {
            font: Font::Body,
            color: cfg.fonts.color.into(),
            align: Align::Center,
        };
        let label_style = TextStyle {
            color: WHITE,
            ..text_style
        };
        let delay = cfg.buttons.press_delay_ms;
        let (bw, bh) = (BUTTON_SIZE.0 as f32, BUTTON_SIZE.1 as f32);
        let music_w = MUSIC_BUTTON_SIZE.0 as f32;

        let texts = INSTRUCTIONS
            .iter()
            .enumerate()
            .map(|(i, line)| TextSprite::new(*line, (w / 2.0, 300.0 + 22.0 * i as f32), text_style))
            .collect();

        let [bird_w, bird_h] = cfg.bird.size;
        let bird = Bird::new(
            (cfg.bird.start_x, h / 2.0),
            (bird_w as f32, bird_h as f32),
            assets.bird_frames.clone(),
            BirdPhysics::from_config(&cfg.bird, &cfg.flying),
        );
        let road = Road::new(assets.road.clone(), cfg.flying.floor_y);

        let mut buttons = vec![
            Button::new(
                (w / 2.0 - bw / 2.0, h / 2.0 + 25.0),
                assets.buttons.start.clone(),
                ButtonAction::Start,
                delay,
            )
            .with_label("START", label_style),
            Button::new(
                (w / 2.0 - bw / 2.0, h - bh - 10.0),
                assets.buttons.reskin.clone(),
                ButtonAction::Reskin,
                delay,
            )
            .with_label("SKIN", label_style),
            Button::new(
                (w / 4.0 - bw / 2.0, h - bh - 10.0),
                assets.buttons.redress.clone(),
                ButtonAction::Redress,
                delay,
            )
            .with_label("REDRESS", label_style),
            Button::new(
                (w - music_w - 10.0, 10.0),
                assets.buttons.music.clone(),
                ButtonAction::ToggleMusic,
                delay,
            )
            .with_label("♪", label_style),
        ];
        buttons.iter_mut().for_each(Button::hold_off);

        let mut base = SceneBase::new(Some(SceneId::Flying));
        base.groups.insert(GroupKey::Text, Group::Text(texts));
        base.groups.insert(GroupKey::Bird, Group::Bird(bird));
        base.groups.insert(GroupKey::Road, Group::Road(road));
        base.groups.insert(GroupKey::Buttons, Group::Buttons(buttons));
        info!("start screen ready");
        Self { base, skins }
    }

    fn over_button(&self, pos: (f32, f32)) -> bool {
        self.base
            .groups
            .buttons(GroupKey::Buttons)
            .iter()
            .any(|b| b.rect().contains(pos))
    }

    fn reskin(&mut self, ctx: &mut FrameCtx<'_>) {
        let Some(bird) = self.base.groups.bird_mut() else {
            return;
        };
        let Some(current) = bird.current_frame().cloned() else {
            return;
        };
        match self.skins.edit(&current) {
            EditOutcome::Saved(skin) => bird.set_skin(skin),
            EditOutcome::Cancelled => debug!("reskin cancelled"),
            EditOutcome::Quit => ctx.outbox.post(GameEvent::Quit),
        }
    }
}

impl Scene for StartScreen {
    fn id(&self) -> SceneId {
        SceneId::Start
    }

    fn base(&self) -> &SceneBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut SceneBase {
        &mut self.base
    }

    fn handle_event(&mut self, event: &InputEvent, ctx: &mut FrameCtx<'_>) -> Result<(), GameError> {
        match *event {
            InputEvent::MouseDown {
                button: MouseButton::Left,
                pos,
            } => {
                if self.over_button(pos) {
                    for button in self.base.groups.buttons_mut(GroupKey::Buttons) {
                        button.press_at(pos, ctx.now_ms, ctx.outbox);
                    }
                } else {
                    self.base.done = true;
                }
            }
            InputEvent::Key(Key::Space | Key::Enter) => self.base.done = true,
            InputEvent::Game(GameEvent::ButtonPressed(action)) => match action {
                ButtonAction::Start => self.base.done = true,
                ButtonAction::Reskin => {
                    info!("reskin requested");
                    self.reskin(ctx);
                }
                ButtonAction::Redress => {
                    info!("redress requested");
                    if let Some(bird) = self.base.groups.bird_mut() {
                        bird.redress();
                    }
                }
                ButtonAction::ToggleMusic => ctx.outbox.post(GameEvent::ToggleMusic),
                ButtonAction::Restart => {}
            },
            _ => {}
        }
        Ok(())
    }

    fn on_enter(&mut self, mut handoff: Groups) -> Result<(), GameError> {
        self.base
            .groups
            .absorb(&mut handoff, &[GroupKey::Bird, GroupKey::Road], SceneId::Start)?;
        if !handoff.is_empty() {
            debug!("start screen drops {handoff:?}");
        }
        self.base.groups.move_to_end(GroupKey::Buttons);
        self.base
            .groups
            .buttons_mut(GroupKey::Buttons)
            .iter_mut()
            .for_each(Button::hold_off);
        Ok(())
    }

    fn on_exit(&mut self) -> Groups {
        self.base.groups.hand_over(&[GroupKey::Bird, GroupKey::Road])
    }
}
