//! Procedurally painted sprites, built once from config.

use std::rc::Rc;

use log::info;

use crate::config::Config;
use crate::error::AssetError;
use crate::gfx::{Rgb, SHADOW, Sprite, WHITE};

const SKY_TOP: Rgb = Rgb(70, 180, 200);
const SKY_BOT: Rgb = Rgb(190, 232, 245);
const GRASS: Rgb = Rgb(84, 168, 55);
const GRASS_LIGHT: Rgb = Rgb(110, 200, 70);
const DIRT: Rgb = Rgb(210, 185, 110);
const DIRT_DARK: Rgb = Rgb(185, 160, 90);
const PIPE_L: Rgb = Rgb(74, 122, 26);
const PIPE_M: Rgb = Rgb(100, 170, 40);
const PIPE_R: Rgb = Rgb(115, 191, 46);
const PIPE_HI: Rgb = Rgb(145, 215, 62);
const CAP_DARK: Rgb = Rgb(60, 100, 20);
const HILL_FAR: Rgb = Rgb(120, 195, 75);
const HILL_NEAR: Rgb = Rgb(95, 175, 55);
const BIRD_EYE: Rgb = Rgb(255, 255, 255);
const BIRD_PUPIL: Rgb = Rgb(20, 20, 20);

// ── Bird palettes ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BirdPalette {
    pub name: &'static str,
    pub body: Rgb,
    pub highlight: Rgb,
    pub wing: Rgb,
    pub beak: Rgb,
    pub beak_highlight: Rgb,
}

pub const CLASSIC: BirdPalette = BirdPalette {
    name: "classic",
    body: Rgb(245, 200, 66),
    highlight: Rgb(255, 225, 100),
    wing: Rgb(215, 165, 35),
    beak: Rgb(225, 75, 35),
    beak_highlight: Rgb(240, 110, 50),
};

pub const SKINS: [BirdPalette; 4] = [
    BirdPalette {
        name: "frost",
        body: Rgb(150, 210, 245),
        highlight: Rgb(210, 240, 255),
        wing: Rgb(90, 150, 210),
        beak: Rgb(240, 140, 40),
        beak_highlight: Rgb(250, 180, 80),
    },
    BirdPalette {
        name: "cardinal",
        body: Rgb(205, 40, 40),
        highlight: Rgb(240, 90, 80),
        wing: Rgb(150, 20, 25),
        beak: Rgb(250, 170, 60),
        beak_highlight: Rgb(255, 205, 110),
    },
    BirdPalette {
        name: "crow",
        body: Rgb(55, 55, 70),
        highlight: Rgb(95, 95, 115),
        wing: Rgb(30, 30, 40),
        beak: Rgb(200, 170, 60),
        beak_highlight: Rgb(230, 200, 90),
    },
    BirdPalette {
        name: "parakeet",
        body: Rgb(110, 205, 90),
        highlight: Rgb(170, 235, 140),
        wing: Rgb(60, 150, 60),
        beak: Rgb(235, 110, 60),
        beak_highlight: Rgb(250, 150, 90),
    },
];

/// `wing` is -1 (up), 0 (level) or 1 (down).
pub fn paint_bird(w: usize, h: usize, palette: &BirdPalette, wing: i32) -> Sprite {
    let mut s = Sprite::new(w, h);
    let cx = w as i32 / 2;
    let cy = h as i32 / 2;
    let scale = (w as f64 / 11.0).min(h as f64 / 6.0);

    // Body core
    let bw = (3.0 * scale).max(2.0) as i32;
    let bh = (2.0 * scale).max(2.0) as i32;
    s.fill_ellipse(cx as f32, cy as f32, bw as f32 + 0.5, bh as f32, palette.body);

    // Highlight (top of body)
    s.fill_rect(cx - bw / 2, cy - bh + 1, bw, 1i32.max((scale * 0.8) as i32), palette.highlight);

    // Wing
    let wing_h = (1.5 * scale).max(1.0) as i32;
    let wing_w = (2.5 * scale).max(1.0) as i32;
    let wing_y = cy + wing * (scale * 0.8) as i32 - wing_h / 2;
    s.fill_rect(cx - bw + 1, wing_y, wing_w, wing_h, palette.wing);

    // Eye
    let eye_r = (0.8 * scale).max(1.0) as i32;
    let ex = cx + bw - (1.5 * scale) as i32;
    let ey = cy - bh + (0.8 * scale).max(1.0) as i32;
    s.fill_rect(ex, ey, eye_r + 1, eye_r + 1, BIRD_EYE);
    s.fill_rect(ex + eye_r / 2 + 1, ey + eye_r / 2, (eye_r / 2).max(1), (eye_r / 2).max(1), BIRD_PUPIL);

    // Beak
    let beak_x = cx + bw - 1;
    let beak_w = (w as i32 - beak_x).min((2.5 * scale).max(2.0) as i32);
    let beak_h = (1.5 * scale).max(1.0) as i32;
    let beak_y = cy - beak_h / 3;
    s.fill_rect(beak_x, beak_y, beak_w, beak_h / 2 + 1, palette.beak_highlight);
    s.fill_rect(beak_x, beak_y + beak_h / 2 + 1, beak_w - 1, beak_h / 2, palette.beak);

    // Tail
    let tail_w = (1.5 * scale).max(1.0) as i32;
    s.fill_rect(cx - bw - tail_w + 1, cy - 2, tail_w, 4, palette.wing);
    s
}

pub fn paint_bird_frames(w: usize, h: usize, palette: &BirdPalette) -> Vec<Sprite> {
    [-1, 0, 1]
        .into_iter()
        .map(|wing| paint_bird(w, h, palette, wing))
        .collect()
}

// ── Scenery ─────────────────────────────────────────────────────────────────

fn paint_background(w: usize, h: usize, horizon: usize) -> Sprite {
    let mut s = Sprite::new(w, h);
    for y in 0..h {
        let t = (y.min(horizon) * 256 / horizon.max(1)) as u16;
        let c = Rgb::lerp(SKY_TOP, SKY_BOT, t);
        for x in 0..w {
            s.set(x as i32, y as i32, c);
        }
    }

    let scale = h as f64 / 48.0;
    let base = horizon as i32;
    // Far hills
    for x in 0..w as i32 {
        let fx = x as f64 * 0.04 / scale;
        let hh = (fx.sin() * 6.0 + (fx * 1.7).sin() * 3.0) * scale;
        let top = base - hh as i32 - (4.0 * scale) as i32;
        for y in top..base {
            s.set(x, y, HILL_FAR);
        }
    }
    // Near hills
    for x in 0..w as i32 {
        let fx = (x as f64 + 40.0) * 0.06 / scale;
        let hh = (fx.sin() * 4.0 + (fx * 2.3).sin() * 2.0) * scale;
        let top = base - hh as i32 - (2.0 * scale) as i32;
        for y in top..base {
            s.set(x, y, HILL_NEAR);
        }
    }
    s
}

/// A strip wide enough to be shifted left by up to two tiles.
fn paint_road(w: usize, h: usize, tile: f32) -> Sprite {
    let tile = tile.max(1.0) as i32;
    let width = w + 2 * tile as usize;
    let mut s = Sprite::new(width, h);
    let grass_h = (h as i32 / 10).max(2);
    for x in 0..width as i32 {
        let alt = (x / (tile / 2).max(1)) % 2 == 0;
        s.fill_rect(x, 0, 1, grass_h / 2, if alt { GRASS } else { GRASS_LIGHT });
        s.fill_rect(x, grass_h / 2, 1, grass_h - grass_h / 2, GRASS);
    }
    for y in grass_h..h as i32 {
        for x in 0..width as i32 {
            let stripe = (x + (y - grass_h)).rem_euclid(tile) < tile / 2;
            s.set(x, y, if stripe { DIRT } else { DIRT_DARK });
        }
    }
    s
}

fn pipe_shade(x: i32, total_w: i32) -> Rgb {
    if total_w <= 1 {
        return PIPE_M;
    }
    let t = (x as f64 / (total_w - 1) as f64 * 256.0) as u16;
    if t < 64 {
        Rgb::lerp(PIPE_L, PIPE_M, (t * 4).min(256))
    } else if t < 100 {
        Rgb::lerp(PIPE_M, PIPE_HI, ((t - 64) * 7).min(256))
    } else if t < 160 {
        Rgb::lerp(PIPE_HI, PIPE_R, ((t - 100) * 4).min(256))
    } else {
        Rgb::lerp(PIPE_R, PIPE_L, ((t - 160) * 3).min(256))
    }
}

/// Upward-facing pipe: cap on top, body below.
fn paint_pipe(w: usize, h: usize) -> Sprite {
    let mut s = Sprite::new(w, h);
    let (w, h) = (w as i32, h as i32);
    let inset = (w / 12).max(1);
    let cap_h = (h / 13).clamp(2, 24);

    for x in inset..w - inset {
        let c = pipe_shade(x - inset, w - 2 * inset);
        for y in cap_h..h {
            s.set(x, y, c);
        }
    }
    for x in 0..w {
        let c = pipe_shade(x, w);
        for y in 0..cap_h {
            s.set(x, y, c);
        }
        s.set(x, 0, CAP_DARK);
        s.set(x, cap_h - 1, CAP_DARK);
    }
    s
}

// ── UI ──────────────────────────────────────────────────────────────────────

fn paint_button(w: usize, h: usize, face: Rgb) -> Sprite {
    let mut s = Sprite::new(w, h);
    let (w, h) = (w as i32, h as i32);
    s.fill_rect(1, 0, w - 2, h, SHADOW);
    s.fill_rect(0, 1, w, h - 2, SHADOW);
    s.fill_rect(2, 2, w - 4, h - 4, face);
    s.fill_rect(2, 2, w - 4, ((h - 4) / 4).max(1), Rgb::lerp(face, WHITE, 96));
    s.fill_rect(2, h - 2 - ((h - 4) / 5).max(1), w - 4, ((h - 4) / 5).max(1), face.darken());
    s
}

fn greyscale(c: Rgb) -> Rgb {
    let l = ((c.0 as u16 * 3 + c.1 as u16 * 6 + c.2 as u16) / 10) as u8;
    Rgb(l, l, l)
}

fn paint_girl(w: usize, h: usize) -> Sprite {
    const HAIR: Rgb = Rgb(110, 60, 30);
    const SKIN: Rgb = Rgb(250, 210, 175);
    const DRESS: Rgb = Rgb(220, 90, 140);
    const DRESS_DARK: Rgb = Rgb(170, 60, 105);
    const LEGS: Rgb = Rgb(235, 195, 160);
    const MOUTH: Rgb = Rgb(150, 40, 50);

    let mut s = Sprite::new(w, h);
    let wf = w as f32;
    let hf = h as f32;
    let cx = wf / 2.0;
    let head_r = wf * 0.22;
    let head_cy = hf * 0.17;

    // Hair behind the head, then the face.
    s.fill_ellipse(cx, head_cy + head_r * 0.4, head_r * 1.35, head_r * 1.5, HAIR);
    s.fill_ellipse(cx, head_cy, head_r, head_r * 1.1, SKIN);
    s.fill_rect(
        (cx - head_r) as i32,
        (head_cy - head_r * 1.1) as i32,
        (head_r * 2.0) as i32,
        (head_r * 0.5) as i32,
        HAIR,
    );

    // Eyes narrowed, mouth turned down.
    let eye_y = (head_cy - head_r * 0.1) as i32;
    let eye_dx = (head_r * 0.45) as i32;
    s.fill_rect(cx as i32 - eye_dx - 2, eye_y, 4, 1, BIRD_PUPIL);
    s.fill_rect(cx as i32 + eye_dx - 2, eye_y, 4, 1, BIRD_PUPIL);
    let mouth_y = (head_cy + head_r * 0.5) as i32;
    s.fill_rect(cx as i32 - 3, mouth_y, 6, 1, MOUTH);
    s.set(cx as i32 - 4, mouth_y + 1, MOUTH);
    s.set(cx as i32 + 3, mouth_y + 1, MOUTH);

    // Dress as a widening trapezoid.
    let top = (head_cy + head_r * 1.1) as i32;
    let bottom = (hf * 0.8) as i32;
    for y in top..bottom {
        let t = (y - top) as f32 / (bottom - top).max(1) as f32;
        let half = wf * (0.18 + 0.3 * t);
        let c = if (y - top) % 9 < 2 { DRESS_DARK } else { DRESS };
        s.fill_rect((cx - half) as i32, y, (half * 2.0) as i32, 1, c);
    }
    // Arms crossed over the chest.
    let arm_y = top + (bottom - top) / 5;
    s.fill_rect((cx - wf * 0.3) as i32, arm_y, (wf * 0.6) as i32, 3, SKIN);

    // Legs
    let leg_w = (wf * 0.08).max(2.0) as i32;
    s.fill_rect((cx - wf * 0.15) as i32, bottom, leg_w, h as i32 - bottom, LEGS);
    s.fill_rect((cx + wf * 0.15) as i32 - leg_w, bottom, leg_w, h as i32 - bottom, LEGS);
    s
}

// ── Bundle ──────────────────────────────────────────────────────────────────

pub struct ButtonSprites {
    pub start: Rc<Sprite>,
    pub restart: Rc<Sprite>,
    pub reskin: Rc<Sprite>,
    pub redress: Rc<Sprite>,
    pub music: Rc<Sprite>,
}

/// Ready-to-draw handles shared by every scene.
pub struct Assets {
    pub background: Rc<Sprite>,
    pub road: Rc<Sprite>,
    pub pipe_up: Rc<Sprite>,
    pub pipe_down: Rc<Sprite>,
    pub bird_frames: Vec<Rc<Sprite>>,
    pub buttons: ButtonSprites,
    pub girl: Rc<Sprite>,
}

pub const BUTTON_SIZE: (usize, usize) = (80, 30);
pub const MUSIC_BUTTON_SIZE: (usize, usize) = (26, 26);
pub const GIRL_SIZE: (usize, usize) = (60, 110);

fn checked(name: &'static str, w: i64, h: i64, min: i64) -> Result<(usize, usize), AssetError> {
    if w < min || h < min {
        return Err(AssetError::InvalidSize { name, w, h });
    }
    Ok((w as usize, h as usize))
}

impl Assets {
    pub fn build(cfg: &Config) -> Result<Self, AssetError> {
        let (sw, sh) = checked(
            "background",
            cfg.window.screen_width as i64,
            cfg.window.screen_height as i64,
            1,
        )?;
        let floor = cfg.flying.floor_y as i64;
        let (_, road_h) = checked("road", sw as i64, sh as i64 - floor, 1)?;
        let [pw, ph] = cfg.flying.pipe_size;
        let (pw, ph) = checked("pipe", pw as i64, ph as i64, 4)?;
        let [bw, bh] = cfg.bird.size;
        let (bw, bh) = checked("bird", bw as i64, bh as i64, 6)?;

        let pipe_up = Rc::new(paint_pipe(pw, ph));
        let reskin = Rc::new(paint_button(BUTTON_SIZE.0, BUTTON_SIZE.1, Rgb(140, 90, 200)));
        let pipe_down = Rc::new(pipe_up.flipped_vertical());
        let assets = Self {
            background: Rc::new(paint_background(sw, sh, floor.max(1) as usize)),
            road: Rc::new(paint_road(sw, road_h, cfg.flying.road_tile_width)),
            pipe_up,
            pipe_down,
            bird_frames: paint_bird_frames(bw, bh, &CLASSIC)
                .into_iter()
                .map(Rc::new)
                .collect(),
            buttons: ButtonSprites {
                start: Rc::new(paint_button(BUTTON_SIZE.0, BUTTON_SIZE.1, Rgb(230, 120, 40))),
                restart: Rc::new(paint_button(BUTTON_SIZE.0, BUTTON_SIZE.1, Rgb(60, 140, 220))),
                reskin: reskin.clone(),
                redress: Rc::new(reskin.recolored(greyscale)),
                music: Rc::new(paint_button(
                    MUSIC_BUTTON_SIZE.0,
                    MUSIC_BUTTON_SIZE.1,
                    Rgb(60, 170, 120),
                )),
            },
            girl: Rc::new(paint_girl(GIRL_SIZE.0, GIRL_SIZE.1)),
        };
        info!("assets painted for a {sw}x{sh} screen");
        Ok(assets)
    }
}
