//! The render dispatcher (spec §4.6, §5): one work item per image column,
//! a column-disjoint shared pixel buffer written without locking, and a
//! single mutex-guarded stats/progress struct — replacing the global
//! cursor the Design Notes flag for re-architecture.

use crate::camera::Camera;
use crate::kernel::Kernel;
use crate::math::Color;
use crate::scene::Scene;
use crate::threadpool::ThreadPool;
use rand::rngs::SmallRng;
use rand::SeedableRng;
use std::sync::{Arc, Mutex};

/// A linear RGB pixel buffer, row-major, one [`Color`] per pixel.
pub struct Framebuffer {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<Color>,
}

impl Framebuffer {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![Color::zero(); (width * height) as usize],
        }
    }

    #[inline]
    pub fn set(&mut self, x: u32, y: u32, color: Color) {
        self.pixels[(y * self.width + x) as usize] = color;
    }

    #[inline]
    pub fn get(&self, x: u32, y: u32) -> Color {
        self.pixels[(y * self.width + x) as usize]
    }

    /// Tonemaps and packs the framebuffer into an 8-bit RGBA buffer for the
    /// encoder, applying `original_source`'s exact per-channel curve:
    /// `min(255, sqrt(c) * 100)`.
    pub fn to_rgba8(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.pixels.len() * 4);
        for c in &self.pixels {
            out.push(tonemap_channel(c.x));
            out.push(tonemap_channel(c.y));
            out.push(tonemap_channel(c.z));
            out.push(255);
        }
        out
    }
}

fn tonemap_channel(c: f64) -> u8 {
    let v = c.max(0.0).sqrt() * 100.0;
    v.min(255.0) as u8
}

/// Column-disjoint shared image storage. Each worker writes only the
/// columns it was handed by the dispatcher and never reads a column it
/// did not write, so concurrent writes to distinct columns never alias —
/// the invariant `unsafe impl Sync` below relies on.
struct SharedImage {
    width: u32,
    height: u32,
    pixels: std::cell::UnsafeCell<Vec<Color>>,
}

/// Safety: workers are handed disjoint, non-overlapping column ranges by
/// the dispatcher below and never access a column outside their own
/// assignment, so concurrent writes never touch the same memory.
unsafe impl Sync for SharedImage {}

impl SharedImage {
    fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: std::cell::UnsafeCell::new(vec![Color::zero(); (width * height) as usize]),
        }
    }

    /// # Safety
    /// The caller must own exclusive access to column `x` (no other live
    /// reference to this column exists concurrently).
    unsafe fn set_column_pixel(&self, x: u32, y: u32, color: Color) {
        let pixels = &mut *self.pixels.get();
        pixels[(y * self.width + x) as usize] = color;
    }

    fn into_framebuffer(self) -> Framebuffer {
        Framebuffer {
            width: self.width,
            height: self.height,
            pixels: self.pixels.into_inner(),
        }
    }
}

struct RenderStats {
    total: u32,
    done: u32,
    start: std::time::Instant,
}

impl RenderStats {
    fn new(total: u32) -> Self {
        Self {
            total,
            done: 0,
            start: std::time::Instant::now(),
        }
    }

    fn tick(&mut self, columns: u32) -> (u32, f64) {
        self.done += columns;
        let pct = self.done * 100 / self.total;
        (pct, self.start.elapsed().as_secs_f64())
    }
}

/// Renders `scene` through `camera` at the resolution/sample count implied
/// by `config`, dispatching one work item per image column across
/// `num_threads` worker threads. Per-column RNG seeding (`SmallRng::
/// seed_from_u64(x as u64)`) makes the render deterministic for a given
/// thread count independent of scheduling order, since each column's
/// stream never depends on another's.
pub fn render(
    scene: &Scene,
    camera: &Camera,
    width: u32,
    height: u32,
    samples_per_pixel: u32,
    shadow_rays: u32,
    p_surv: f64,
    num_threads: usize,
    mut on_progress: impl FnMut(u32, f64) + Send + 'static,
) -> Framebuffer {
    let image = Arc::new(SharedImage::new(width, height));
    let stats = Arc::new(Mutex::new(RenderStats::new(width)));
    let pool = ThreadPool::new(num_threads);

    let scene_ptr: *const Scene = scene;
    let camera_ptr: *const Camera = camera;

    // Safety: the thread pool's `wait()` below blocks until every submitted
    // closure has returned, so `scene`/`camera` outlive all borrows taken
    // through these raw pointers; they exist only to cross the `'static`
    // bound `ThreadPool::submit` requires for a per-column closure.
    struct SendPtr<T>(*const T);
    unsafe impl<T> Send for SendPtr<T> {}
    let scene_send = SendPtr(scene_ptr);
    let camera_send = SendPtr(camera_ptr);

    let (progress_tx, progress_rx) = std::sync::mpsc::channel::<(u32, f64)>();

    for x in 0..width {
        let image = Arc::clone(&image);
        let stats = Arc::clone(&stats);
        let scene_send = SendPtr(scene_send.0);
        let camera_send = SendPtr(camera_send.0);
        let progress_tx = progress_tx.clone();

        pool.submit(move || {
            let scene: &Scene = unsafe { &*scene_send.0 };
            let camera: &Camera = unsafe { &*camera_send.0 };
            let mut rng = SmallRng::seed_from_u64(x as u64);
            let kernel = Kernel::new(scene, p_surv, shadow_rays);

            for y in 0..height {
                let mut accum = Color::zero();
                for s in 0..samples_per_pixel {
                    let ray = camera.primary_ray(x, y, s, samples_per_pixel, &mut rng);
                    accum += kernel.trace_primary(ray, &mut rng);
                }
                let pixel = accum / samples_per_pixel as f64;
                unsafe {
                    image.set_column_pixel(x, y, pixel);
                }
            }

            let (pct, elapsed) = stats.lock().unwrap().tick(1);
            let _ = progress_tx.send((pct, elapsed));
        });
    }
    drop(progress_tx);

    // Drain progress updates from a dedicated thread so `on_progress`
    // (which may touch the terminal) never races the worker pool.
    let progress_handle = std::thread::spawn(move || {
        for (pct, elapsed) in progress_rx {
            on_progress(pct, elapsed);
        }
    });

    pool.wait();
    let _ = progress_handle.join();

    Arc::try_unwrap(image)
        .unwrap_or_else(|_| panic!("render: image still referenced after pool.wait()"))
        .into_framebuffer()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tonemap_is_monotonic_and_bounded() {
        let mut prev = tonemap_channel(0.0);
        for i in 1..=200 {
            let c = i as f64 * 0.1;
            let v = tonemap_channel(c);
            assert!(v >= prev);
            assert!(v <= 255);
            prev = v;
        }
    }

    #[test]
    fn tonemap_clamps_negative_to_zero() {
        assert_eq!(tonemap_channel(-5.0), 0);
    }
}
