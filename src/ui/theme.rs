use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use ratatui::style::Color;
use rust_embed::Embed;
use serde::{Deserialize, Deserializer};
use tracing::warn;

#[derive(Embed)]
#[folder = "assets/themes/"]
struct ThemeAssets;

const FALLBACK_THEME: &str = "chalkboard";

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Theme {
    pub name: String,
    pub colors: Palette,
}

/// Resolved colours. Each entry accepts `#rrggbb`, a colour name such as
/// `lightyellow`, or an ANSI index.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
pub struct Palette {
    #[serde(deserialize_with = "color")]
    pub bg: Color,
    #[serde(deserialize_with = "color")]
    pub fg: Color,
    #[serde(deserialize_with = "color")]
    pub muted: Color,
    #[serde(deserialize_with = "color")]
    pub accent: Color,
    #[serde(deserialize_with = "color")]
    pub border: Color,
    #[serde(deserialize_with = "color")]
    pub header_bg: Color,
    #[serde(deserialize_with = "color")]
    pub header_fg: Color,
    #[serde(deserialize_with = "color")]
    pub bar_filled: Color,
    #[serde(deserialize_with = "color")]
    pub bar_empty: Color,
    #[serde(deserialize_with = "color")]
    pub star: Color,
    #[serde(deserialize_with = "color")]
    pub locked: Color,
    #[serde(deserialize_with = "color")]
    pub error: Color,
    #[serde(deserialize_with = "color")]
    pub warning: Color,
    #[serde(deserialize_with = "color")]
    pub success: Color,
}

fn color<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Color, D::Error> {
    let raw = String::deserialize(deserializer)?;
    raw.trim()
        .parse::<Color>()
        .map_err(|_| serde::de::Error::custom(format!("`{raw}` is not a colour")))
}

fn user_theme_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("mathchamp").join("themes"))
}

impl Theme {
    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Look up a theme by name. A readable file in the user theme directory
    /// wins; a broken one is logged and the bundled theme of that name is used.
    pub fn load(name: &str) -> Result<Self> {
        Self::load_from(user_theme_dir().as_deref(), name)
    }

    fn load_from(user_dir: Option<&Path>, name: &str) -> Result<Self> {
        if let Some(path) = user_dir.map(|d| d.join(format!("{name}.toml")))
            && path.is_file()
        {
            let parsed = fs::read_to_string(&path)
                .map_err(anyhow::Error::from)
                .and_then(|content| Self::parse(&content));
            match parsed {
                Ok(theme) => return Ok(theme),
                Err(e) => warn!(path = %path.display(), error = %e, "ignoring user theme"),
            }
        }

        let file = ThemeAssets::get(&format!("{name}.toml"))
            .with_context(|| format!("no theme named `{name}`"))?;
        let content = std::str::from_utf8(file.data.as_ref())?;
        Self::parse(content).with_context(|| format!("bundled theme `{name}` is invalid"))
    }

    /// Bundled theme names plus any in the user theme directory, sorted.
    pub fn available_themes() -> Vec<String> {
        Self::available_in(user_theme_dir().as_deref())
    }

    fn available_in(user_dir: Option<&Path>) -> Vec<String> {
        let bundled = ThemeAssets::iter().filter_map(|f| f.strip_suffix(".toml").map(String::from));
        let user = user_dir
            .and_then(|d| fs::read_dir(d).ok())
            .into_iter()
            .flatten()
            .filter_map(|entry| {
                let path = entry.ok()?.path();
                if path.extension().and_then(|e| e.to_str()) != Some("toml") {
                    return None;
                }
                path.file_stem()?.to_str().map(String::from)
            });

        let mut names: Vec<String> = bundled.chain(user).collect();
        names.sort();
        names.dedup();
        names
    }
}

impl Default for Theme {
    fn default() -> Self {
        ThemeAssets::get(&format!("{FALLBACK_THEME}.toml"))
            .and_then(|file| Self::parse(std::str::from_utf8(file.data.as_ref()).ok()?).ok())
            .unwrap_or_else(|| Self {
                name: "default".to_string(),
                colors: Palette::default(),
            })
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            bg: Color::Rgb(0x1f, 0x2b, 0x24),
            fg: Color::Rgb(0xe8, 0xee, 0xe9),
            muted: Color::Rgb(0x7d, 0x8f, 0x83),
            accent: Color::Rgb(0x8f, 0xd3, 0xfe),
            border: Color::Rgb(0x4a, 0x5d, 0x51),
            header_bg: Color::Rgb(0x2b, 0x3a, 0x31),
            header_fg: Color::Rgb(0xe8, 0xee, 0xe9),
            bar_filled: Color::Rgb(0x8f, 0xd3, 0xfe),
            bar_empty: Color::Rgb(0x2b, 0x3a, 0x31),
            star: Color::Rgb(0xff, 0xd8, 0x66),
            locked: Color::Rgb(0x56, 0x63, 0x5a),
            error: Color::Rgb(0xff, 0x8a, 0x80),
            warning: Color::Rgb(0xff, 0xd8, 0x66),
            success: Color::Rgb(0xa5, 0xe8, 0x87),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn theme_toml(name: &str, star: &str) -> String {
        format!(
            r##"name = "{name}"

[colors]
bg = "#000000"
fg = "white"
muted = "gray"
accent = "#8fd3fe"
border = "8"
header_bg = "#111111"
header_fg = "#eeeeee"
bar_filled = "#8fd3fe"
bar_empty = "#222222"
star = "{star}"
locked = "darkgray"
error = "red"
warning = "yellow"
success = "green"
"##
        )
    }

    #[test]
    fn test_colours_resolve_at_load() {
        let theme = Theme::parse(&theme_toml("mine", "#ff0080")).unwrap();
        assert_eq!(theme.colors.star, Color::Rgb(255, 0, 128));
        assert_eq!(theme.colors.fg, Color::White);
        assert_eq!(theme.colors.locked, Color::DarkGray);
        assert_eq!(theme.colors.border, Color::Indexed(8));
    }

    #[test]
    fn test_bad_colour_is_an_error() {
        let err = Theme::parse(&theme_toml("mine", "#zz0080")).unwrap_err();
        assert!(err.to_string().contains("#zz0080"), "{err}");
    }

    #[test]
    fn test_bundled_themes_parse() {
        let names = Theme::available_in(None);
        assert_eq!(names, vec!["chalkboard", "paper", "sunset"]);
        for name in &names {
            assert_eq!(&Theme::load_from(None, name).unwrap().name, name);
        }
        assert_eq!(Theme::default().name, FALLBACK_THEME);
    }

    #[test]
    fn test_user_theme_overrides_and_extends() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("paper.toml"), theme_toml("my paper", "lightyellow")).unwrap();
        fs::write(dir.path().join("night.toml"), theme_toml("night", "#101010")).unwrap();
        fs::write(dir.path().join("notes.txt"), "not a theme").unwrap();

        assert_eq!(Theme::load_from(Some(dir.path()), "paper").unwrap().name, "my paper");
        assert_eq!(Theme::load_from(Some(dir.path()), "night").unwrap().name, "night");
        assert_eq!(
            Theme::available_in(Some(dir.path())),
            vec!["chalkboard", "night", "paper", "sunset"]
        );
    }

    #[test]
    fn test_broken_user_theme_falls_back_to_bundled() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("sunset.toml"), theme_toml("sunset", "nope")).unwrap();

        let theme = Theme::load_from(Some(dir.path()), "sunset").unwrap();
        assert_eq!(theme, Theme::load_from(None, "sunset").unwrap());
        assert!(Theme::load_from(Some(dir.path()), "missing").is_err());
    }
}
