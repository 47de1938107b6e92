//! The scene machine: owns every scene, routes events, performs hand-offs.

use std::collections::BTreeMap;
use std::rc::Rc;

use log::{debug, error, info};

use crate::assets::Assets;
use crate::audio::Audio;
use crate::config::Config;
use crate::error::GameError;
use crate::gfx::{Sprite, Surface};
use crate::input::{Frame, GameEvent, InputEvent, Key, Outbox};
use crate::scene::{Flying, FrameCtx, GameOver, Scene, SceneId, StartScreen};
use crate::skin::SkinEditor;

pub struct Game {
    scenes: BTreeMap<SceneId, Box<dyn Scene>>,
    active: SceneId,
    running: bool,
    background: Rc<Sprite>,
    audio: Box<dyn Audio>,
    outbox: Outbox,
    clock_ms: u64,
    music_fade_ms: u64,
}

impl Game {
    /// Builds the three scenes once; they are reused on every visit.
    pub fn new(
        cfg: &Config,
        assets: &Assets,
        audio: Box<dyn Audio>,
        skins: Box<dyn SkinEditor>,
        seed: Option<u64>,
    ) -> Result<Self, GameError> {
        let scenes: Vec<Box<dyn Scene>> = vec![
            Box::new(StartScreen::new(cfg, assets, skins)),
            Box::new(Flying::new(cfg, assets, seed)),
            Box::new(GameOver::new(cfg, assets)),
        ];
        let mut game = Self::with_scenes(scenes, SceneId::Start, assets.background.clone(), audio)?;
        game.music_fade_ms = cfg.audio.music_fade_ms;
        game.audio.play_music();
        info!("game ready, starting at {}", game.active);
        Ok(game)
    }

    /// Every scene's declared successor must be registered.
    pub fn with_scenes(
        scenes: Vec<Box<dyn Scene>>,
        start: SceneId,
        background: Rc<Sprite>,
        audio: Box<dyn Audio>,
    ) -> Result<Self, GameError> {
        let scenes: BTreeMap<_, _> = scenes.into_iter().map(|s| (s.id(), s)).collect();
        if !scenes.contains_key(&start) {
            error!("start scene {start} is not registered");
            return Err(GameError::UnknownScene(start));
        }
        for scene in scenes.values() {
            if let Some(next) = scene.next_scene() {
                if !scenes.contains_key(&next) {
                    error!("scene {} leads to unregistered scene {next}", scene.id());
                    return Err(GameError::UnknownScene(next));
                }
            }
        }
        Ok(Self {
            scenes,
            active: start,
            running: true,
            background,
            audio,
            outbox: Outbox::default(),
            clock_ms: 0,
            music_fade_ms: 500,
        })
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn active_id(&self) -> SceneId {
        self.active
    }

    pub fn active_scene(&self) -> Option<&dyn Scene> {
        self.scene(self.active)
    }

    pub fn scene(&self, id: SceneId) -> Option<&dyn Scene> {
        self.scenes.get(&id).map(|s| s.as_ref())
    }

    pub fn audio(&self) -> &dyn Audio {
        self.audio.as_ref()
    }

    pub fn quit(&mut self) {
        if self.running {
            info!("quitting");
        }
        self.running = false;
    }

    fn toggle_music(&mut self) {
        if self.audio.is_music_playing() {
            info!("music off");
            self.audio.fade_out_music(self.music_fade_ms);
        } else {
            info!("music on");
            self.audio.play_music();
        }
    }

    /// One frame: events (posted ones first), update, then the scene flip.
    pub fn tick(&mut self, frame: &Frame, dt_ms: u64) -> Result<(), GameError> {
        self.clock_ms += dt_ms;
        let events: Vec<InputEvent> = self
            .outbox
            .drain()
            .map(InputEvent::Game)
            .chain(frame.events.iter().copied())
            .collect();

        let scene = self
            .scenes
            .get_mut(&self.active)
            .ok_or(GameError::UnknownScene(self.active))?;
        let mut ctx = FrameCtx {
            input: &frame.input,
            audio: self.audio.as_mut(),
            outbox: &mut self.outbox,
            now_ms: self.clock_ms,
            dt_ms,
        };

        let mut quit = false;
        let mut toggles = 0;
        for event in &events {
            match event {
                InputEvent::Quit | InputEvent::Game(GameEvent::Quit) => quit = true,
                InputEvent::Game(GameEvent::ToggleMusic) | InputEvent::Key(Key::Char('m')) => toggles += 1,
                _ => {}
            }
            scene.handle_event(event, &mut ctx)?;
        }
        scene.update(&mut ctx)?;
        let done = scene.is_done();

        for _ in 0..toggles {
            self.toggle_music();
        }
        if quit {
            self.quit();
        }
        if done {
            self.flip_scene()?;
        }
        self.audio.pump();
        Ok(())
    }

    /// Hands the active scene's groups to its successor and activates it.
    pub fn flip_scene(&mut self) -> Result<(), GameError> {
        let from = self.active;
        let current = self.scenes.get(&from).ok_or(GameError::UnknownScene(from))?;
        let Some(to) = current.next_scene() else {
            error!("scene {from} is done but names no next scene");
            return Err(GameError::MissingNextScene(from));
        };
        if !self.scenes.contains_key(&to) {
            error!("scene {from} wants unregistered scene {to}");
            return Err(GameError::UnknownScene(to));
        }

        let handoff = match self.scenes.get_mut(&from) {
            Some(current) => current.on_exit(),
            None => return Err(GameError::UnknownScene(from)),
        };
        debug!("handing {handoff:?} from {from} to {to}");
        self.active = to;
        if let Some(next) = self.scenes.get_mut(&to) {
            next.on_enter(handoff)?;
        }
        if let Some(previous) = self.scenes.get_mut(&from) {
            previous.clear_done();
        }
        info!("scene {from} -> {to}");
        Ok(())
    }

    pub fn draw(&self, surface: &mut dyn Surface) {
        surface.blit(&self.background, 0, 0);
        if let Some(scene) = self.active_scene() {
            scene.draw(surface);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;
    use crate::audio::Silent;
    use crate::gfx::PixelBuf;
    use crate::input::{InputState, MouseButton};
    use crate::scene::{Groups, SceneBase};
    use crate::skin::PaletteSkins;

    /// Finishes on demand and records what it was handed.
    struct Probe {
        id: SceneId,
        base: SceneBase,
        seen: Rc<RefCell<Vec<String>>>,
    }

    impl Probe {
        fn boxed(id: SceneId, next: Option<SceneId>, seen: &Rc<RefCell<Vec<String>>>) -> Box<dyn Scene> {
            Box::new(Self {
                id,
                base: SceneBase::new(next),
                seen: seen.clone(),
            })
        }
    }

    impl Scene for Probe {
        fn id(&self) -> SceneId {
            self.id
        }

        fn base(&self) -> &SceneBase {
            &self.base
        }

        fn base_mut(&mut self) -> &mut SceneBase {
            &mut self.base
        }

        fn handle_event(&mut self, event: &InputEvent, _ctx: &mut FrameCtx<'_>) -> Result<(), GameError> {
            self.seen.borrow_mut().push(format!("{}:{event:?}", self.id));
            if let InputEvent::Key(Key::Enter) = event {
                self.base.done = true;
            }
            Ok(())
        }

        fn on_enter(&mut self, _handoff: Groups) -> Result<(), GameError> {
            self.seen.borrow_mut().push(format!("enter {}", self.id));
            Ok(())
        }

        fn on_exit(&mut self) -> Groups {
            self.seen.borrow_mut().push(format!("exit {}", self.id));
            Groups::new()
        }
    }

    fn background() -> Rc<Sprite> {
        Rc::new(Sprite::new(4, 4))
    }

    fn frame(events: Vec<InputEvent>) -> Frame {
        Frame {
            events,
            input: InputState::default(),
        }
    }

    #[test]
    fn done_without_next_scene_is_fatal() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let scenes = vec![Probe::boxed(SceneId::Start, None, &seen)];
        let mut game = Game::with_scenes(scenes, SceneId::Start, background(), Box::new(Silent::default())).unwrap();
        let err = game.tick(&frame(vec![InputEvent::Key(Key::Enter)]), 16).unwrap_err();
        assert!(matches!(err, GameError::MissingNextScene(SceneId::Start)));
        assert_eq!(game.active_id(), SceneId::Start);
        assert!(!seen.borrow().iter().any(|s| s.starts_with("exit")));
    }

    #[test]
    fn unregistered_successor_is_rejected_up_front() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let scenes = vec![Probe::boxed(SceneId::Start, Some(SceneId::Flying), &seen)];
        let err = Game::with_scenes(scenes, SceneId::Start, background(), Box::new(Silent::default()))
            .err()
            .unwrap();
        assert!(matches!(err, GameError::UnknownScene(SceneId::Flying)));
    }

    #[test]
    fn flip_follows_the_exit_enter_clear_protocol() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let scenes = vec![
            Probe::boxed(SceneId::Start, Some(SceneId::Flying), &seen),
            Probe::boxed(SceneId::Flying, Some(SceneId::Start), &seen),
        ];
        let mut game = Game::with_scenes(scenes, SceneId::Start, background(), Box::new(Silent::default())).unwrap();
        game.tick(&frame(vec![InputEvent::Key(Key::Enter)]), 16).unwrap();
        assert_eq!(game.active_id(), SceneId::Flying);
        assert!(!game.scene(SceneId::Start).unwrap().is_done());
        assert!(!game.active_scene().unwrap().is_done());
        let log = seen.borrow();
        assert_eq!(&log[log.len() - 2..], &["exit start".to_string(), "enter flying".to_string()]);
    }

    #[test]
    fn posted_events_arrive_next_frame_before_input() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let scenes = vec![Probe::boxed(SceneId::Start, None, &seen)];
        let mut game = Game::with_scenes(scenes, SceneId::Start, background(), Box::new(Silent::default())).unwrap();
        game.outbox.post(GameEvent::ToggleMusic);
        game.tick(&frame(vec![InputEvent::Key(Key::Space)]), 16).unwrap();
        assert_eq!(
            *seen.borrow(),
            vec![
                "start:Game(ToggleMusic)".to_string(),
                "start:Key(Space)".to_string()
            ]
        );
    }

    #[test]
    fn quit_stops_the_machine() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let scenes = vec![Probe::boxed(SceneId::Start, None, &seen)];
        let mut game = Game::with_scenes(scenes, SceneId::Start, background(), Box::new(Silent::default())).unwrap();
        assert!(game.is_running());
        game.tick(&frame(vec![InputEvent::Quit]), 16).unwrap();
        assert!(!game.is_running());
    }

    fn real_game() -> Game {
        let cfg = Config::default();
        let assets = Assets::build(&cfg).unwrap();
        Game::new(
            &cfg,
            &assets,
            Box::new(Silent::default()),
            Box::new(PaletteSkins::new()),
            Some(3),
        )
        .unwrap()
    }

    #[test]
    fn music_starts_and_toggles() {
        let mut game = real_game();
        assert!(game.audio().is_music_playing());
        game.tick(&frame(vec![InputEvent::Key(Key::Char('m'))]), 16).unwrap();
        assert!(!game.audio().is_music_playing());
        game.tick(&frame(vec![InputEvent::Game(GameEvent::ToggleMusic)]), 16).unwrap();
        assert!(game.audio().is_music_playing());
    }

    #[test]
    fn music_button_toggles_two_frames_later() {
        let mut game = real_game();
        let mut input = InputState::default();
        // the music button sits in the top right corner
        input.mouse = (432.0 - 36.0 + 5.0, 15.0);
        input.set_held(MouseButton::Left, true);
        let press = Frame::idle(input);
        // first poll arms the cooldown, the press lands after it
        game.tick(&press, 16).unwrap();
        game.tick(&press, 600).unwrap();
        assert!(game.audio().is_music_playing());
        let idle = frame(vec![]);
        game.tick(&idle, 16).unwrap();
        assert!(game.audio().is_music_playing());
        game.tick(&idle, 16).unwrap();
        assert!(!game.audio().is_music_playing());
        assert_eq!(game.active_id(), SceneId::Start);
    }

    #[test]
    fn click_starts_a_flight() {
        let mut game = real_game();
        let mut input = InputState::default();
        input.mouse = (10.0, 200.0);
        input.set_held(MouseButton::Left, true);
        let click = Frame {
            events: vec![InputEvent::MouseDown {
                button: MouseButton::Left,
                pos: (10.0, 200.0),
            }],
            input,
        };
        game.tick(&click, 16).unwrap();
        assert_eq!(game.active_id(), SceneId::Flying);
        assert!(game.active_scene().unwrap().groups().bird().unwrap().flying);
    }

    #[test]
    fn quick_tap_on_restart_goes_back_to_start() {
        let mut game = real_game();
        game.tick(&frame(vec![InputEvent::Key(Key::Enter)]), 16).unwrap();
        assert_eq!(game.active_id(), SceneId::Flying);
        let mut frames = 0;
        while game.active_id() == SceneId::Flying {
            game.tick(&frame(vec![]), 16).unwrap();
            frames += 1;
            assert!(frames < 1_000, "the bird never landed");
        }
        assert_eq!(game.active_id(), SceneId::GameOver);

        // press and release land in one frame over RESTART, so nothing is held
        let pos = (216.0, 165.0);
        let tap = frame(vec![
            InputEvent::MouseDown {
                button: MouseButton::Left,
                pos,
            },
            InputEvent::MouseUp {
                button: MouseButton::Left,
                pos,
            },
        ]);
        assert!(!tap.input.is_held(MouseButton::Left));
        game.tick(&tap, 16).unwrap();
        game.tick(&frame(vec![]), 16).unwrap();
        assert_eq!(game.active_id(), SceneId::Start);
    }

    #[test]
    fn draw_puts_background_first() {
        let game = real_game();
        let mut canvas = PixelBuf::new(432, 468);
        game.draw(&mut canvas);
        assert_ne!(canvas.get(200, 10), crate::gfx::BLACK);
    }
}
