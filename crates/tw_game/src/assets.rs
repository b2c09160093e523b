//! Startup asset loading.
//!
//! Every resource is an independent task: the map description, each sprite
//! image and each tile image. They run concurrently on the rayon pool and are
//! joined before the frame loop starts. Only the map is required; an image
//! that fails to load is logged and left out, and the renderer skips it.

use rayon::prelude::*;
use std::collections::HashMap;
use std::path::Path;

use tw_core::facing::Facing;

use crate::config::GameConfig;
use crate::draw_list::TextureKey;
use crate::error::LoadError;
use crate::tilemap::{load_map_from_path, TileMap};

pub struct AssetBundle {
    pub map: TileMap,
    pub images: HashMap<TextureKey, image::RgbaImage>,
}

pub fn load_assets(config: &GameConfig) -> Result<AssetBundle, LoadError> {
    let mut requests: Vec<(TextureKey, &str)> = Facing::ALL
        .iter()
        .map(|&facing| {
            (
                TextureKey::Sprite(facing),
                config.sprite_images.path_for(facing),
            )
        })
        .collect();
    requests.extend(
        config
            .tile_images
            .iter()
            .map(|(&code, path)| (TextureKey::Tile(code), path.as_str())),
    );

    let (map, images) = rayon::join(
        || load_map_from_path(Path::new(&config.map_path)),
        || load_images(&requests),
    );

    let map = map?;
    log::info!(
        "Map '{}' loaded: {}x{} tiles, {} blocking; {}/{} images",
        config.map_path,
        map.width(),
        map.height(),
        map.blocking_count(),
        images.len(),
        requests.len()
    );
    Ok(AssetBundle { map, images })
}

fn load_images(requests: &[(TextureKey, &str)]) -> HashMap<TextureKey, image::RgbaImage> {
    requests
        .par_iter()
        .filter_map(|&(key, path)| match load_image(Path::new(path)) {
            Ok(image) => Some((key, image)),
            Err(err) => {
                log::warn!("Image for {:?} unavailable: {}", key, err);
                None
            }
        })
        .collect()
}

pub fn load_image(path: &Path) -> Result<image::RgbaImage, LoadError> {
    let bytes = std::fs::read(path).map_err(|source| LoadError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let decoded = image::load_from_memory(&bytes).map_err(|source| LoadError::Image {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(decoded.to_rgba8())
}
