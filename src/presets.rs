//! Built-in artistic style presets.
//!
//! A preset's suffix is appended verbatim to the user's prompt, so every
//! suffix starts with a comma separator.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StylePreset {
    pub name: &'static str,
    pub prompt_suffix: &'static str,
    pub preview_url: &'static str,
}

pub const STYLE_PRESETS: &[StylePreset] = &[
    StylePreset {
        name: "Cinematic",
        prompt_suffix: ", cinematic lighting, photorealistic, 8k, highly detailed, film grain",
        preview_url: "https://picsum.photos/seed/cine/300/300",
    },
    StylePreset {
        name: "Cyberpunk",
        prompt_suffix:
            ", cyberpunk aesthetic, neon lights, futuristic city, glowing accents, synthwave palette",
        preview_url: "https://picsum.photos/seed/cyber/300/300",
    },
    StylePreset {
        name: "Anime",
        prompt_suffix:
            ", high quality anime style, vibrant colors, studio ghibli inspiration, cel shaded",
        preview_url: "https://picsum.photos/seed/anime/300/300",
    },
    StylePreset {
        name: "Oil Painting",
        prompt_suffix:
            ", expressive oil painting, thick brushstrokes, classical art style, textured canvas",
        preview_url: "https://picsum.photos/seed/oil/300/300",
    },
    StylePreset {
        name: "Minimalist",
        prompt_suffix: ", minimalist design, clean lines, flat colors, modern aesthetic, vector art",
        preview_url: "https://picsum.photos/seed/mini/300/300",
    },
    StylePreset {
        name: "3D Render",
        prompt_suffix: ", octane render, 3d isometric, soft lighting, unreal engine 5, raytracing",
        preview_url: "https://picsum.photos/seed/3d/300/300",
    },
];

/// The preset selected when a session starts.
pub fn default_preset() -> &'static StylePreset {
    &STYLE_PRESETS[0]
}

/// Case-insensitive lookup by preset name.
pub fn find(name: &str) -> Option<&'static StylePreset> {
    let name = name.trim();
    STYLE_PRESETS
        .iter()
        .find(|preset| preset.name.eq_ignore_ascii_case(name))
}

/// Reverse lookup used to label the active style.
pub fn by_suffix(suffix: &str) -> Option<&'static StylePreset> {
    STYLE_PRESETS
        .iter()
        .find(|preset| preset.prompt_suffix == suffix)
}
