//! Gallery controller: owns the world, the cookie registry and the cache.
//!
//! All mutation goes through `GalleryCore` methods; the platform layer holds
//! it behind a single `RefCell` so the step interval, render loop, feed
//! completions and input events take turns as the one writer.

use std::collections::HashSet;

use crate::physics::{Body, BodyId, Material, PhysicsWorld, Vec2};

use super::feed::FeedEntry;
use super::images::{AssetState, ImageCache};
use super::silhouette;
use super::surface::RenderSurface;

/// Hard cap on live cookies. The remote feed is unbounded; once the cap is
/// reached the oldest feed-sourced cookie is evicted to make room. Cookies
/// the user submitted themselves are never evicted.
pub const MAX_COOKIES: usize = 64;

/// Viewports narrower than this get the large (mobile) cookie size.
const NARROW_VIEWPORT: f32 = 768.0;
const SIZE_FACTOR_NARROW: f32 = 0.32;
const SIZE_FACTOR_WIDE: f32 = 0.16;

const WALL_THICKNESS: f32 = 20.0;

const COOKIE_RESTITUTION: f32 = 0.4;
const COOKIE_FRICTION: f32 = 0.5;
const COOKIE_DENSITY: f32 = 0.001;

const PLACEHOLDER_FILL: &str = "rgba(200, 100, 50, 0.8)";

/// Random number generator (xorshift32)
#[inline]
fn xorshift32(state: &mut u32) -> u32 {
    let mut x = *state;
    x ^= x << 13;
    x ^= x >> 17;
    x ^= x << 5;
    *state = x;
    x
}

/// Uniform float in [lo, hi).
#[inline]
fn rand_range(state: &mut u32, lo: f32, hi: f32) -> f32 {
    let unit = (xorshift32(state) >> 8) as f32 / (1u32 << 24) as f32;
    lo + unit * (hi - lo).max(0.0)
}

/// One gallery cookie: an image identifier tied to exactly one body.
pub struct Cookie {
    pub url: String,
    pub body: BodyId,
    /// Rendered square size in logical pixels, fixed at spawn time.
    pub size: f32,
    pub submitted_by_user: bool,
}

pub struct GalleryCore {
    world: PhysicsWorld,
    cookies: Vec<Cookie>,
    known: HashSet<String>,
    cache: ImageCache,
    walls: Vec<BodyId>,
    width: f32,
    height: f32,
    rng_state: u32,
    active: bool,
}

impl GalleryCore {
    /// Create the world and its boundary for a logical viewport.
    pub fn new(width: f32, height: f32) -> Self {
        let mut core = Self {
            world: PhysicsWorld::new(),
            cookies: Vec::new(),
            known: HashSet::new(),
            cache: ImageCache::new(),
            walls: Vec::new(),
            width,
            height,
            rng_state: 12345,
            active: true,
        };
        core.build_walls();
        core
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn cookie_count(&self) -> usize {
        self.cookies.len()
    }

    pub fn cookies(&self) -> &[Cookie] {
        &self.cookies
    }

    pub fn cookie(&self, url: &str) -> Option<&Cookie> {
        self.cookies.iter().find(|c| c.url == url)
    }

    pub fn world(&self) -> &PhysicsWorld {
        &self.world
    }

    /// Cookie size factor for the current viewport (mobile vs desktop).
    pub fn size_factor(&self) -> f32 {
        if self.width < NARROW_VIEWPORT {
            SIZE_FACTOR_NARROW
        } else {
            SIZE_FACTOR_WIDE
        }
    }

    /// Floor plus left/right walls at the current logical bounds.
    fn build_walls(&mut self) {
        for id in self.walls.drain(..).collect::<Vec<_>>() {
            self.world.remove_body(id);
        }
        let w = self.width;
        let h = self.height;
        self.walls = vec![
            self.world
                .add_body(Body::static_rect(w / 2.0, h, w, WALL_THICKNESS)),
            self.world
                .add_body(Body::static_rect(0.0, h / 2.0, WALL_THICKNESS, h)),
            self.world
                .add_body(Body::static_rect(w, h / 2.0, WALL_THICKNESS, h)),
        ];
    }

    /// Add a cookie for `url` unless one already exists. Returns whether a
    /// body was created. The image load is queued, not awaited; until it
    /// completes the cookie renders as a silhouette.
    pub fn add_image(&mut self, url: &str, submitted_by_user: bool) -> bool {
        if !self.active || self.known.contains(url) {
            return false;
        }

        if self.cookies.len() >= MAX_COOKIES {
            self.evict_oldest_feed_cookie();
        }

        let size = self.width * self.size_factor();
        let x = rand_range(&mut self.rng_state, size, self.width - size);
        let outline = silhouette::vertices(size);
        let body = Body::from_vertices(
            x,
            -size,
            &outline,
            Material::new(COOKIE_RESTITUTION, COOKIE_FRICTION, COOKIE_DENSITY),
        );
        let id = self.world.add_body(body);

        self.cookies.push(Cookie {
            url: url.to_string(),
            body: id,
            size,
            submitted_by_user,
        });
        self.known.insert(url.to_string());
        self.cache.ensure_loading(url);
        true
    }

    /// Drop the oldest feed-sourced cookie. Its URL stays in the known set
    /// so the next poll cannot re-materialize it.
    fn evict_oldest_feed_cookie(&mut self) {
        let Some(idx) = self.cookies.iter().position(|c| !c.submitted_by_user) else {
            return;
        };
        let cookie = self.cookies.remove(idx);
        self.world.remove_body(cookie.body);
    }

    /// Merge a feed response: one new body per identifier not seen before.
    /// Returns how many cookies were added.
    pub fn sync_feed(&mut self, entries: &[FeedEntry]) -> usize {
        if !self.active {
            return 0;
        }
        entries
            .iter()
            .filter(|entry| self.add_image(&entry.url, false))
            .count()
    }

    /// Advance the simulation by one fixed timestep (`dt` in seconds).
    pub fn step(&mut self, dt: f32) {
        if self.active {
            self.world.step(dt);
        }
    }

    /// Clear, recycle out-of-bounds cookies, and draw the current state.
    ///
    /// Recycling teleports a stray body back above the viewport with zeroed
    /// velocities in the same frame it is detected; bodies are never removed
    /// here, so nothing accumulates off-screen.
    pub fn render_frame(&mut self, surface: &mut dyn RenderSurface) {
        surface.clear(self.width, self.height);

        for i in 0..self.cookies.len() {
            let id = self.cookies[i].body;
            let size = self.cookies[i].size;

            let Some(body) = self.world.body(id) else {
                continue;
            };
            let pos = body.pos;

            let margin = size * 2.0;
            if pos.x < -margin
                || pos.x > self.width + margin
                || pos.y < -margin
                || pos.y > self.height + margin
            {
                let x = rand_range(&mut self.rng_state, size, self.width - size);
                self.world.set_position(id, x, -margin);
                self.world.set_velocity(id, 0.0, 0.0);
                self.world.set_angular_velocity(id, 0.0);
            }

            let Some(body) = self.world.body(id) else {
                continue;
            };
            let (pos, angle) = (body.pos, body.angle);
            let url = &self.cookies[i].url;

            surface.save();
            surface.translate(pos.x, pos.y);
            surface.rotate(angle);

            let half = size / 2.0;
            let drew_image = match self.cache.get(url) {
                Some(AssetState::Loaded { .. }) => surface
                    .draw_image(url, -half, -half, size, size)
                    .is_ok(),
                _ => false,
            };
            if !drew_image {
                surface.fill_polygon(&silhouette::vertices(size), PLACEHOLDER_FILL);
            }

            surface.restore();
        }
    }

    /// New logical bounds. The boundary is rebuilt; existing bodies keep
    /// their coordinates and only future spawns/recycles use the new size.
    pub fn resize(&mut self, width: f32, height: f32) {
        if !self.active {
            return;
        }
        self.width = width;
        self.height = height;
        self.build_walls();
    }

    /// Tear the gallery down. Safe to call more than once.
    pub fn deactivate(&mut self) {
        if !self.active {
            return;
        }
        self.active = false;
        self.world.clear();
        self.cookies.clear();
        self.known.clear();
        self.walls.clear();
        self.cache.clear();
    }

    // === POINTER INPUT (logical coordinates) ===

    pub fn pointer_down(&mut self, x: f32, y: f32) -> bool {
        self.active && self.world.start_drag(Vec2::new(x, y)).is_some()
    }

    pub fn pointer_move(&mut self, x: f32, y: f32) {
        self.world.update_drag(Vec2::new(x, y));
    }

    pub fn pointer_up(&mut self) {
        self.world.end_drag();
    }

    // === IMAGE CACHE PASSTHROUGH ===

    pub fn asset_state(&self, url: &str) -> Option<AssetState> {
        self.cache.get(url)
    }

    pub fn cache_generation(&self) -> u64 {
        self.cache.generation()
    }

    /// URLs whose platform load should start now.
    pub fn take_pending_loads(&mut self) -> Vec<String> {
        self.cache.take_pending_loads()
    }

    pub fn image_loaded(&mut self, generation: u64, url: &str, width: u32, height: u32) -> bool {
        self.cache.resolve_loaded(generation, url, width, height)
    }

    pub fn image_failed(&mut self, generation: u64, url: &str) -> bool {
        self.cache.resolve_failed(generation, url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gallery::surface::DrawError;

    /// Records draw calls; URLs in `fail` reject `draw_image` like a
    /// tainted canvas would.
    #[derive(Default)]
    struct TestSurface {
        clears: usize,
        images: Vec<String>,
        fills: usize,
        fail: HashSet<String>,
    }

    impl RenderSurface for TestSurface {
        fn clear(&mut self, _width: f32, _height: f32) {
            self.clears += 1;
        }
        fn save(&mut self) {}
        fn restore(&mut self) {}
        fn translate(&mut self, _x: f32, _y: f32) {}
        fn rotate(&mut self, _angle: f32) {}

        fn draw_image(
            &mut self,
            url: &str,
            _x: f32,
            _y: f32,
            _w: f32,
            _h: f32,
        ) -> Result<(), DrawError> {
            if self.fail.contains(url) {
                return Err(DrawError("tainted".into()));
            }
            self.images.push(url.to_string());
            Ok(())
        }

        fn fill_polygon(&mut self, _points: &[Vec2], _color: &str) {
            self.fills += 1;
        }
    }

    fn feed(urls: &[&str]) -> Vec<FeedEntry> {
        urls.iter().map(|u| FeedEntry { url: u.to_string() }).collect()
    }

    #[test]
    fn add_image_is_idempotent() {
        let mut core = GalleryCore::new(800.0, 600.0);
        assert!(core.add_image("a.png", false));
        assert!(!core.add_image("a.png", true));
        assert_eq!(core.cookie_count(), 1);
    }

    #[test]
    fn desktop_cookie_spawns_above_the_viewport() {
        let mut core = GalleryCore::new(800.0, 600.0);
        core.add_image("x.png", true);

        let cookie = core.cookie("x.png").expect("cookie registered");
        assert_eq!(cookie.size, 800.0 * 0.16);
        assert!(cookie.submitted_by_user);

        let body = core.world().body(cookie.body).expect("body exists");
        assert_eq!(body.pos.y, -128.0);
        assert!(body.pos.x >= 128.0 && body.pos.x <= 800.0 - 128.0);
    }

    #[test]
    fn narrow_viewport_uses_the_large_size_factor() {
        let mut core = GalleryCore::new(400.0, 700.0);
        core.add_image("m.png", false);
        assert_eq!(core.cookie("m.png").unwrap().size, 400.0 * 0.32);
    }

    #[test]
    fn feed_sync_adds_only_unseen_urls() {
        let mut core = GalleryCore::new(800.0, 600.0);
        assert_eq!(core.sync_feed(&feed(&["a", "b"])), 2);

        let body_a = core.cookie("a").unwrap().body;
        let body_b = core.cookie("b").unwrap().body;

        assert_eq!(core.sync_feed(&feed(&["a", "b", "c"])), 1);
        assert_eq!(core.cookie_count(), 3);
        // Existing cookies keep their body identity.
        assert_eq!(core.cookie("a").unwrap().body, body_a);
        assert_eq!(core.cookie("b").unwrap().body, body_b);
    }

    #[test]
    fn out_of_bounds_body_is_recycled_in_the_same_frame() {
        let mut core = GalleryCore::new(800.0, 600.0);
        core.add_image("x.png", true);
        let id = core.cookie("x.png").unwrap().body;

        // Push the body past the lower margin (600 + 2 * 128).
        core.world.set_position(id, 400.0, 900.0);
        core.world.set_velocity(id, 12.0, 340.0);
        core.world.set_angular_velocity(id, 3.0);

        let mut surface = TestSurface::default();
        core.render_frame(&mut surface);

        let body = core.world().body(id).unwrap();
        assert_eq!(body.pos.y, -256.0);
        assert!(body.pos.x >= 128.0 && body.pos.x <= 800.0 - 128.0);
        assert_eq!(body.velocity, Vec2::zero());
        assert_eq!(body.angular_vel, 0.0);
    }

    #[test]
    fn bodies_inside_the_margin_are_left_alone() {
        let mut core = GalleryCore::new(800.0, 600.0);
        core.add_image("x.png", true);
        let id = core.cookie("x.png").unwrap().body;

        core.world.set_position(id, 400.0, 700.0); // below floor but within 2x size
        let mut surface = TestSurface::default();
        core.render_frame(&mut surface);

        assert_eq!(core.world().body(id).unwrap().pos, Vec2::new(400.0, 700.0));
    }

    #[test]
    fn pending_and_failed_assets_render_as_silhouettes() {
        let mut core = GalleryCore::new(800.0, 600.0);
        core.add_image("slow.png", false);
        core.add_image("broken.png", false);
        let generation = core.cache_generation();
        core.image_failed(generation, "broken.png");

        let mut surface = TestSurface::default();
        core.render_frame(&mut surface);

        assert_eq!(surface.clears, 1);
        assert_eq!(surface.fills, 2);
        assert!(surface.images.is_empty());
    }

    #[test]
    fn loaded_assets_draw_and_taint_errors_fall_back_to_the_fill() {
        let mut core = GalleryCore::new(800.0, 600.0);
        core.add_image("ok.png", false);
        core.add_image("tainted.png", false);
        let generation = core.cache_generation();
        core.image_loaded(generation, "ok.png", 256, 256);
        core.image_loaded(generation, "tainted.png", 256, 256);

        let mut surface = TestSurface::default();
        surface.fail.insert("tainted.png".to_string());
        core.render_frame(&mut surface);

        assert_eq!(surface.images, vec!["ok.png"]);
        assert_eq!(surface.fills, 1);
    }

    #[test]
    fn resize_rebuilds_walls_but_leaves_bodies_in_place() {
        let mut core = GalleryCore::new(800.0, 600.0);
        core.add_image("x.png", true);
        let id = core.cookie("x.png").unwrap().body;

        core.world.set_position(id, 321.0, 99.0);
        core.world.set_velocity(id, 7.0, -4.0);
        core.resize(1024.0, 768.0);

        let body = core.world().body(id).unwrap();
        assert_eq!(body.pos, Vec2::new(321.0, 99.0));
        assert_eq!(body.velocity, Vec2::new(7.0, -4.0));
        assert_eq!(core.width(), 1024.0);

        // Three walls plus the cookie.
        assert_eq!(core.world().body_count(), 4);
    }

    #[test]
    fn cap_evicts_the_oldest_feed_cookie_but_never_user_cookies() {
        let mut core = GalleryCore::new(800.0, 600.0);
        core.add_image("mine.png", true);
        for i in 0..MAX_COOKIES - 1 {
            core.add_image(&format!("feed-{i}.png"), false);
        }
        assert_eq!(core.cookie_count(), MAX_COOKIES);

        core.add_image("overflow.png", false);
        assert_eq!(core.cookie_count(), MAX_COOKIES);
        assert!(core.cookie("mine.png").is_some());
        assert!(core.cookie("feed-0.png").is_none());

        // The evicted URL stays known and cannot come back via the feed.
        assert_eq!(core.sync_feed(&feed(&["feed-0.png"])), 0);
    }

    #[test]
    fn deactivate_clears_everything_and_is_idempotent() {
        let mut core = GalleryCore::new(800.0, 600.0);
        core.sync_feed(&feed(&["a", "b"]));
        core.deactivate();

        assert!(!core.is_active());
        assert_eq!(core.cookie_count(), 0);
        assert_eq!(core.world().body_count(), 0);
        assert!(!core.add_image("late.png", false));

        core.deactivate();
        assert_eq!(core.cookie_count(), 0);
    }

    #[test]
    fn stale_image_completions_after_deactivate_are_discarded() {
        let mut core = GalleryCore::new(800.0, 600.0);
        core.add_image("a.png", false);
        let generation = core.cache_generation();

        core.deactivate();
        assert!(!core.image_loaded(generation, "a.png", 64, 64));
        assert_eq!(core.asset_state("a.png"), None);
    }

    #[test]
    fn drag_grabs_a_cookie_under_the_pointer() {
        let mut core = GalleryCore::new(800.0, 600.0);
        core.add_image("x.png", true);
        let id = core.cookie("x.png").unwrap().body;
        let pos = core.world().body(id).unwrap().pos;

        assert!(core.pointer_down(pos.x, pos.y));
        core.pointer_move(pos.x + 50.0, pos.y);
        assert_eq!(core.world().dragging(), Some(id));

        core.pointer_up();
        assert_eq!(core.world().dragging(), None);
    }
}
