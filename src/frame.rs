use crate::core::{FrameGovernor, ParticleSet, Settings, SpawnPolicy, Theme, Viewport};
use instant::Instant;
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys as web;

/// Monotonic millisecond clock shared by the frame loop and the input
/// callbacks so every timestamp comparison in the core uses one time base.
#[derive(Clone, Copy)]
pub struct Clock {
    origin: Instant,
}

impl Clock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }

    pub fn now_ms(&self) -> f64 {
        self.origin.elapsed().as_secs_f64() * 1000.0
    }
}

pub struct FrameContext {
    pub clock: Clock,
    pub governor: FrameGovernor,
    pub particles: ParticleSet,
    pub settings: Rc<RefCell<Settings>>,
    pub canvas: web::HtmlCanvasElement,
    pub ctx: web::CanvasRenderingContext2d,
    pub last_instant: Instant,
}

impl FrameContext {
    pub fn frame(&mut self) {
        let now = Instant::now();
        // RAF stops in background tabs; clamp the catch-up step
        let dt_sec = (now - self.last_instant).as_secs_f32().min(0.1);
        self.last_instant = now;
        let now_ms = self.clock.now_ms();

        self.governor.sample(now_ms);

        let settings = self.settings.borrow().clone();
        let vp = Viewport {
            width: self.canvas.width() as f32,
            height: self.canvas.height() as f32,
        };
        let policy = SpawnPolicy {
            reduced_motion: settings.reduced_motion,
            guard_engaged: self.governor.is_throttled() || settings.low_power,
            governor_cap: self
                .governor
                .effective_cap(settings.max_particles, settings.low_power),
        };

        self.particles.set_theme(settings.theme);
        match settings.theme {
            Theme::Forest => self.particles.spawn_forest(now_ms, &policy, &vp),
            Theme::Ocean => self.particles.spawn_ocean(&policy, &vp),
            Theme::Cosmic => self.particles.spawn_cosmic(&policy, &vp),
            Theme::Void => {}
        }
        self.particles.step(dt_sec, &vp);
        cull_retired(&mut self.particles, &vp);

        // one bad frame must not wedge the loop; log and try again next tick
        if let Err(e) = paint(&self.ctx, &self.particles, &vp) {
            log::error!("[frame] paint error: {:?}", e);
        }
    }

    /// Session restart: clear the sample window, un-throttle, drop every
    /// entity and the leaf spawn timer so no pre-reset state leaks forward.
    pub fn reset(&mut self) {
        self.governor.reset();
        self.particles.reset_all();
    }
}

/// Renderer-side culling: retire entities that left the viewport or fully
/// faded. The spawn layer deliberately never does this itself.
fn cull_retired(particles: &mut ParticleSet, vp: &Viewport) {
    let h = vp.height;
    particles
        .leaves_mut()
        .cull(|leaf| leaf.alpha > 0.0 && leaf.pos.y < h + 40.0);
    particles
        .specks_mut()
        .cull(|speck| speck.base.y + speck.radius > -10.0);
}

fn paint(
    ctx: &web::CanvasRenderingContext2d,
    particles: &ParticleSet,
    vp: &Viewport,
) -> Result<(), JsValue> {
    let (w, h) = (vp.width as f64, vp.height as f64);
    ctx.clear_rect(0.0, 0.0, w, h);

    let mut draw_err: Option<JsValue> = None;

    particles.leaves().for_each(|leaf| {
        ctx.save();
        ctx.set_global_alpha(leaf.alpha as f64);
        ctx.set_fill_style_str("#7aa45a");
        let result = ctx
            .translate(leaf.pos.x as f64, leaf.pos.y as f64)
            .and_then(|_| ctx.rotate(leaf.rotation as f64));
        match result {
            Ok(()) => {
                let s = leaf.size as f64;
                ctx.fill_rect(-s / 2.0, -s / 4.0, s, s / 2.0);
            }
            Err(e) => draw_err = Some(e),
        }
        ctx.restore();
    });

    particles.fireflies().for_each(|fly| {
        ctx.set_global_alpha(fly.current_alpha() as f64);
        ctx.set_fill_style_str("#d9f2a0");
        ctx.begin_path();
        if let Err(e) = ctx.arc(
            fly.pos.x as f64,
            fly.pos.y as f64,
            fly.radius as f64,
            0.0,
            std::f64::consts::TAU,
        ) {
            draw_err = Some(e);
        }
        ctx.fill();
    });

    particles.specks().for_each(|speck| {
        ctx.set_global_alpha(speck.alpha as f64);
        ctx.set_fill_style_str("#bfe3ff");
        ctx.begin_path();
        if let Err(e) = ctx.arc(
            speck.x() as f64,
            speck.base.y as f64,
            speck.radius as f64,
            0.0,
            std::f64::consts::TAU,
        ) {
            draw_err = Some(e);
        }
        ctx.fill();
    });

    particles.stars().for_each(|star| {
        ctx.set_global_alpha(star.current_alpha() as f64);
        ctx.set_fill_style_str(&star.color);
        ctx.begin_path();
        if let Err(e) = ctx.arc(
            star.pos.x as f64,
            star.pos.y as f64,
            star.radius as f64,
            0.0,
            std::f64::consts::TAU,
        ) {
            draw_err = Some(e);
        }
        ctx.fill();
    });

    ctx.set_global_alpha(1.0);
    match draw_err {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

pub fn start_loop(frame_ctx: Rc<RefCell<FrameContext>>) {
    let tick: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
    let tick_clone = tick.clone();
    let frame_ctx_tick = frame_ctx.clone();
    *tick.borrow_mut() = Some(Closure::wrap(Box::new(move || {
        frame_ctx_tick.borrow_mut().frame();
        if let Some(w) = web::window() {
            if let Some(cb) = tick_clone.borrow().as_ref() {
                _ = w.request_animation_frame(cb.as_ref().unchecked_ref());
            }
        }
    }) as Box<dyn FnMut()>));
    if let Some(w) = web::window() {
        if let Some(cb) = tick.borrow().as_ref() {
            _ = w.request_animation_frame(cb.as_ref().unchecked_ref());
        }
    }
}
