use log::info;

use super::{FrameCtx, Group, GroupKey, Groups, Scene, SceneBase, SceneId};
use crate::assets::{Assets, BUTTON_SIZE};
use crate::config::Config;
use crate::entity::{Button, ButtonAction, Girl, PipeCommand};
use crate::error::GameError;
use crate::gfx::{Align, Font, TextStyle, WHITE};
use crate::input::{GameEvent, InputEvent, Key, MouseButton};

const CARRIED: [GroupKey; 4] = [GroupKey::Pipes, GroupKey::Score, GroupKey::Bird, GroupKey::Road];

/// The frozen crash tableau with the onlooker and a restart button on top.
pub struct GameOver {
    base: SceneBase,
}

impl GameOver {
    pub fn new(cfg: &Config, assets: &Assets) -> Self {
        let (w, h) = cfg.screen_size();
        let label = TextStyle {
            font: Font::Body,
            color: WHITE,
            align: Align::Center,
        };
        let restart = Button::new(
            (w / 2.0 - BUTTON_SIZE.0 as f32 / 2.0, h / 2.0 - 80.0),
            assets.buttons.restart.clone(),
            ButtonAction::Restart,
            cfg.buttons.press_delay_ms,
        )
        .with_label("RESTART", label);

        let mut base = SceneBase::new(Some(SceneId::Start));
        base.groups.insert(
            GroupKey::Girl,
            Group::Girl(Girl::new((120.0, 240.0), assets.girl.clone())),
        );
        base.groups
            .insert(GroupKey::RestartButton, Group::Buttons(vec![restart]));
        Self { base }
    }
}

impl Scene for GameOver {
    fn id(&self) -> SceneId {
        SceneId::GameOver
    }

    fn base(&self) -> &SceneBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut SceneBase {
        &mut self.base
    }

    fn handle_event(&mut self, event: &InputEvent, ctx: &mut FrameCtx<'_>) -> Result<(), GameError> {
        if let InputEvent::MouseDown {
            button: MouseButton::Left,
            pos,
        } = *event
        {
            for button in self.base.groups.buttons_mut(GroupKey::RestartButton) {
                button.press_at(pos, ctx.now_ms, ctx.outbox);
            }
        }
        if matches!(
            event,
            InputEvent::Game(GameEvent::ButtonPressed(ButtonAction::Restart)) | InputEvent::Key(Key::Enter)
        ) {
            info!("restart requested");
            self.base.done = true;
        }
        Ok(())
    }

    fn on_enter(&mut self, mut handoff: Groups) -> Result<(), GameError> {
        let groups = &mut self.base.groups;
        groups.absorb(&mut handoff, &CARRIED, SceneId::GameOver)?;
        if let Some(pipes) = groups.pipes_mut() {
            pipes.update(Some(PipeCommand::SetScrollSpeed(0.0)));
        }
        // Drawn last, over the crash.
        groups.move_to_end(GroupKey::Girl);
        groups.move_to_end(GroupKey::RestartButton);
        groups
            .buttons_mut(GroupKey::RestartButton)
            .iter_mut()
            .for_each(Button::hold_off);
        Ok(())
    }

    fn on_exit(&mut self) -> Groups {
        let groups = &mut self.base.groups;
        if let Some(bird) = groups.bird_mut() {
            bird.reset();
        }
        if let Some(pipes) = groups.pipes_mut() {
            pipes.clear();
        }
        groups.hand_over(&[GroupKey::Bird, GroupKey::Pipes, GroupKey::Road, GroupKey::Score])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::Silent;
    use crate::entity::{Bird, BirdPhysics, Entity, Orientation, Pipe, PipeGroup, Road, ScoreText};
    use crate::input::{InputState, Outbox};

    fn setup() -> (GameOver, Assets) {
        let cfg = Config::default();
        let assets = Assets::build(&cfg).unwrap();
        (GameOver::new(&cfg, &assets), assets)
    }

    fn handoff(assets: &Assets) -> Groups {
        let mut pipes = PipeGroup::new();
        for (i, x) in [100.0, 300.0].into_iter().enumerate() {
            pipes.push(Pipe::new(
                i as u64,
                (x, 234.0),
                Orientation::Up,
                100.0,
                2.0,
                assets.pipe_up.clone(),
            ));
        }
        let mut bird = Bird::new(
            (50.0, 234.0),
            (50.0, 35.0),
            assets.bird_frames.clone(),
            BirdPhysics::default(),
        );
        bird.flying = true;
        bird.visible = false;
        let style = TextStyle {
            font: Font::Score { scale: 6 },
            color: WHITE,
            align: Align::Center,
        };

        let mut g = Groups::new();
        g.insert(GroupKey::Pipes, Group::Pipes(pipes));
        g.insert(GroupKey::Score, Group::Score(ScoreText::new((216.0, 12.0), style)));
        g.insert(GroupKey::Bird, Group::Bird(bird));
        g.insert(GroupKey::Road, Group::Road(Road::new(assets.road.clone(), 384.0)));
        g
    }

    fn step(scene: &mut GameOver, now_ms: u64) {
        let input = InputState::default();
        let mut audio = Silent::default();
        let mut outbox = Outbox::default();
        let mut ctx = FrameCtx {
            input: &input,
            audio: &mut audio,
            outbox: &mut outbox,
            now_ms,
            dt_ms: 16,
        };
        scene.update(&mut ctx).unwrap();
    }

    #[test]
    fn entry_freezes_every_pipe() {
        let (mut scene, assets) = setup();
        scene.on_enter(handoff(&assets)).unwrap();
        let before: Vec<_> = scene.groups().pipes().unwrap().iter().map(|p| p.rect()).collect();
        for i in 0..100 {
            step(&mut scene, i * 16);
        }
        let after: Vec<_> = scene.groups().pipes().unwrap().iter().map(|p| p.rect()).collect();
        assert_eq!(before, after);
        assert!(scene.groups().pipes().unwrap().iter().all(|p| p.scroll_speed() == 0.0));
    }

    #[test]
    fn onlooker_and_restart_are_drawn_last() {
        let (mut scene, assets) = setup();
        scene.on_enter(handoff(&assets)).unwrap();
        assert_eq!(
            scene.groups().keys(),
            vec![
                GroupKey::Pipes,
                GroupKey::Score,
                GroupKey::Bird,
                GroupKey::Road,
                GroupKey::Girl,
                GroupKey::RestartButton
            ]
        );
    }

    #[test]
    fn missing_score_is_fatal() {
        let (mut scene, assets) = setup();
        let mut g = handoff(&assets);
        g.take(GroupKey::Score);
        let err = scene.on_enter(g).unwrap_err();
        assert!(matches!(
            err,
            GameError::MissingGroup {
                scene: SceneId::GameOver,
                group: GroupKey::Score
            }
        ));
    }

    #[test]
    fn restart_press_or_enter_finishes() {
        let (mut scene, _) = setup();
        let input = InputState::default();
        let mut audio = Silent::default();
        let mut outbox = Outbox::default();
        let mut ctx = FrameCtx {
            input: &input,
            audio: &mut audio,
            outbox: &mut outbox,
            now_ms: 0,
            dt_ms: 16,
        };
        scene
            .handle_event(&InputEvent::Game(GameEvent::ButtonPressed(ButtonAction::Start)), &mut ctx)
            .unwrap();
        assert!(!scene.is_done());
        scene.handle_event(&InputEvent::Key(Key::Enter), &mut ctx).unwrap();
        assert!(scene.is_done());
        assert_eq!(scene.next_scene(), Some(SceneId::Start));
    }

    #[test]
    fn exit_resets_bird_and_empties_pipes() {
        let (mut scene, assets) = setup();
        scene.on_enter(handoff(&assets)).unwrap();
        step(&mut scene, 0);
        let out = scene.on_exit();
        let bird = out.bird().unwrap();
        assert!(bird.visible);
        assert!(!bird.flying);
        assert_eq!(bird.rect().center(), (50.0, 234.0));
        assert!(out.pipes().unwrap().is_empty());
        assert!(out.score().is_some());
        assert_eq!(scene.groups().keys(), vec![GroupKey::Girl, GroupKey::RestartButton]);
    }
}
