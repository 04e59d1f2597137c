use hecs::World;
use sdl2::pixels::Color;
use sdl2::rect::Rect;
use sdl2::render::WindowCanvas;

use crate::components::{Fighter, FighterFsm, MAX_HP};
use crate::scene::Arena;

const HP_BAR_WIDTH: u32 = 80;
const HP_BAR_HEIGHT: u32 = 8;
/// Vertical gap between a fighter's head and its HP bar.
const HP_BAR_GAP: f32 = 18.0;

const FLOOR_COLOR: Color = Color::RGB(60, 48, 36);
const FIGHTER_COLOR: Color = Color::RGB(210, 210, 220);
const HURT_COLOR: Color = Color::RGB(220, 40, 40);
const HITBOX_COLOR: Color = Color::RGB(255, 220, 60);

/// Debug view of the simulation: fighter bodies, live hitboxes, HP bars, and
/// a one-line telemetry readout for the window title. Polls the per-tick
/// snapshots; it never reaches into simulation internals beyond them.
pub struct DebugHud {
    /// Frame counter driving the hurt blink.
    frame: u64,
}

impl DebugHud {
    pub fn new() -> Self {
        Self { frame: 0 }
    }

    /// One status line per tick, fed to the window title.
    pub fn status_line(&self, world: &World) -> String {
        let mut line = String::from("skirmish");
        for (_e, (fighter, fsm)) in world.query::<(&Fighter, &FighterFsm)>().iter() {
            let snap = fighter.snapshot(fsm);
            line.push_str(&format!(
                "  |  {} hp:{} {} pos:({:.0},{:.0}) vel:({:.0},{:.0}){}{}",
                fighter.id,
                snap.hp,
                snap.state,
                snap.position.x,
                snap.position.y,
                snap.velocity.x,
                snap.velocity.y,
                if snap.is_attacking { " atk" } else { "" },
                if snap.grounded { " gnd" } else { "" },
            ));
        }
        line
    }

    pub fn draw(
        &mut self,
        canvas: &mut WindowCanvas,
        world: &World,
        arena: &Arena,
    ) -> Result<(), String> {
        self.frame += 1;

        canvas.set_draw_color(Color::RGB(18, 18, 24));
        canvas.clear();

        // Ground slab.
        canvas.set_draw_color(FLOOR_COLOR);
        canvas.fill_rect(Rect::new(
            0,
            arena.floor_y as i32,
            arena.width as u32,
            (arena.height - arena.floor_y) as u32,
        ))?;

        for (_e, fighter) in world.query::<&Fighter>().iter() {
            let body = &fighter.body;
            let min = body.min();

            // Hurt feedback: red tint, blinking.
            let blinked_out = fighter.hurt_tint && (self.frame / 6) % 2 == 0;
            canvas.set_draw_color(if fighter.hurt_tint {
                HURT_COLOR
            } else {
                FIGHTER_COLOR
            });
            let rect = Rect::new(
                min.x as i32,
                min.y as i32,
                body.size.x as u32,
                body.size.y as u32,
            );
            if blinked_out {
                canvas.draw_rect(rect)?;
            } else {
                canvas.fill_rect(rect)?;
            }

            if fighter.hitbox.in_world() {
                canvas.set_draw_color(HITBOX_COLOR);
                let hb_min = fighter.hitbox.min();
                canvas.draw_rect(Rect::new(
                    hb_min.x as i32,
                    hb_min.y as i32,
                    fighter.hitbox.size.x as u32,
                    fighter.hitbox.size.y as u32,
                ))?;
            }

            self.draw_hp_bar(canvas, fighter)?;
        }

        Ok(())
    }

    fn draw_hp_bar(&self, canvas: &mut WindowCanvas, fighter: &Fighter) -> Result<(), String> {
        let body = &fighter.body;
        let x = (body.pos.x - HP_BAR_WIDTH as f32 / 2.0) as i32;
        let y = (body.min().y - HP_BAR_GAP) as i32;

        canvas.set_draw_color(Color::RGB(70, 70, 70));
        canvas.fill_rect(Rect::new(x, y, HP_BAR_WIDTH, HP_BAR_HEIGHT))?;

        // Clamp only the readout: the simulation itself lets hp go negative.
        let hp = fighter.hp.clamp(0, MAX_HP);
        let fill = (HP_BAR_WIDTH as f32 * hp as f32 / MAX_HP as f32) as u32;
        if fill > 0 {
            canvas.set_draw_color(Color::RGB(90, 200, 90));
            canvas.fill_rect(Rect::new(x, y, fill, HP_BAR_HEIGHT))?;
        }
        Ok(())
    }
}
