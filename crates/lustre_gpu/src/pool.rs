//! Filter texture pool
//!
//! Filters need short-lived offscreen targets every frame. Creating GPU
//! textures is expensive, so released textures go onto a free-list keyed by
//! their size class and are handed out again to the next request with the
//! same key.
//!
//! Requested sizes are rounded up to the next power of two (in pixels) so
//! that regions differing by a few pixels share textures. A request that
//! exactly matches the screen's pixel size gets its own exact-size bucket
//! instead, since full-screen passes are common and a power-of-two texture
//! there can waste most of its area.

use rustc_hash::FxHashMap;

use crate::backend::RenderBackend;
use crate::texture::{MsaaQuality, RenderTexture, TextureDescriptor};

/// Tolerance subtracted before rounding sizes up to whole pixels
const PIXEL_EPSILON: f64 = 1e-6;

/// Bucket a pooled texture belongs to
///
/// Width and height are pixel sizes of the texture (already rounded to the
/// pool's granularity). Resolution is quantised to quarter steps.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PoolKey {
    pub width: u32,
    pub height: u32,
    pub resolution: u32,
    pub multisample: MsaaQuality,
}

impl PoolKey {
    pub fn new(width: u32, height: u32, resolution: f64, multisample: MsaaQuality) -> Self {
        Self {
            width,
            height,
            resolution: (resolution * 4.0).round().max(0.0) as u32,
            multisample,
        }
    }
}

/// Statistics for pool performance monitoring
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TexturePoolStats {
    /// Number of requests served from a free-list
    pub hits: u64,
    /// Number of requests that created a new texture
    pub misses: u64,
    /// Textures currently handed out
    pub in_use: usize,
    /// Textures sitting in free-lists
    pub free: usize,
    /// Textures created over the pool's lifetime (minus destroyed ones)
    pub created: usize,
}

impl TexturePoolStats {
    /// Cache hit rate (0.0 - 1.0)
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// Size-keyed pool of reusable render textures
///
/// Unbounded: nothing is evicted until [`TexturePool::clear`] is called.
pub struct TexturePool {
    free: FxHashMap<PoolKey, Vec<RenderTexture>>,
    /// Screen size in pixels, for the exact-size bucket
    screen_pixels: Option<(u32, u32)>,
    full_screen: bool,
    stats: TexturePoolStats,
}

impl Default for TexturePool {
    fn default() -> Self {
        Self::new()
    }
}

impl TexturePool {
    pub fn new() -> Self {
        Self {
            free: FxHashMap::default(),
            screen_pixels: None,
            full_screen: true,
            stats: TexturePoolStats::default(),
        }
    }

    /// Enable or disable the exact screen-size bucket
    pub fn set_full_screen_enabled(&mut self, enabled: bool) {
        self.full_screen = enabled;
    }

    /// Record the screen size in pixels
    pub fn set_screen_size(&mut self, width: u32, height: u32) {
        self.screen_pixels = Some((width, height));
    }

    /// Pixel size and key a request maps to
    pub fn key_for(
        &self,
        width: f64,
        height: f64,
        resolution: f64,
        multisample: MsaaQuality,
    ) -> PoolKey {
        let pixel_width = ((width * resolution - PIXEL_EPSILON).ceil() as u32).max(1);
        let pixel_height = ((height * resolution - PIXEL_EPSILON).ceil() as u32).max(1);

        let exact_screen = self.full_screen && self.screen_pixels == Some((pixel_width, pixel_height));
        if exact_screen {
            PoolKey::new(pixel_width, pixel_height, resolution, multisample)
        } else {
            PoolKey::new(
                pixel_width.next_power_of_two(),
                pixel_height.next_power_of_two(),
                resolution,
                multisample,
            )
        }
    }

    /// Acquire a texture for a region of `width` x `height` logical units
    ///
    /// Pops a free texture with the same key, otherwise asks the backend for a
    /// new one. The returned texture may hold stale contents from its last
    /// user; clearing it is the caller's decision.
    pub fn acquire(
        &mut self,
        backend: &mut dyn RenderBackend,
        width: f64,
        height: f64,
        resolution: f64,
        multisample: MsaaQuality,
    ) -> RenderTexture {
        let key = self.key_for(width, height, resolution, multisample);
        self.stats.in_use += 1;

        if let Some(mut texture) = self.free.get_mut(&key).and_then(Vec::pop) {
            self.stats.hits += 1;
            self.stats.free -= 1;
            texture.set_resolution(resolution);
            return texture;
        }

        self.stats.misses += 1;
        self.stats.created += 1;
        let descriptor = TextureDescriptor {
            width: key.width,
            height: key.height,
            multisample,
        };
        let id = backend.create_texture(&descriptor);
        tracing::debug!(
            "filter texture pool miss: created {}x{} (resolution {}, {:?}), {} textures total",
            key.width,
            key.height,
            resolution,
            multisample,
            self.stats.created
        );

        RenderTexture::new(id, descriptor, resolution, key)
    }

    /// Return a texture to the free-list for its key
    ///
    /// Contents are left as they are.
    pub fn release(&mut self, mut texture: RenderTexture) {
        if self.stats.in_use == 0 {
            tracing::warn!(
                "texture {:?} released to a pool with no textures in use",
                texture.id()
            );
        } else {
            self.stats.in_use -= 1;
        }

        texture.filter_frame = None;
        self.stats.free += 1;
        self.free.entry(texture.pool_key()).or_default().push(texture);
    }

    /// Destroy every free texture
    ///
    /// Textures currently in use are unaffected and may still be released
    /// afterwards.
    pub fn clear(&mut self, backend: &mut dyn RenderBackend) {
        let dropped = self.stats.free;
        for texture in self.free.drain().flat_map(|(_, list)| list) {
            backend.destroy_texture(texture.id());
        }
        self.stats.created -= dropped;
        self.stats.free = 0;
        tracing::debug!("filter texture pool cleared ({} textures destroyed)", dropped);
    }

    pub fn stats(&self) -> TexturePoolStats {
        self.stats.clone()
    }

    /// Number of distinct keys that have a free-list
    pub fn key_count(&self) -> usize {
        self.free.len()
    }

    /// Free textures waiting under `key`
    pub fn free_count(&self, key: &PoolKey) -> usize {
        self.free.get(key).map_or(0, Vec::len)
    }

    /// Keys with a free-list, in no particular order
    pub fn keys(&self) -> impl Iterator<Item = &PoolKey> {
        self.free.keys()
    }
}
