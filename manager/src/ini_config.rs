//! `OptiScaler.ini` reader/writer.
//!
//! Every field has a compiled-in default. Reading never fails on a bad key:
//! a missing or unparsable value leaves that field at its default.

use ini::{Ini, ParseOption, WriteOption};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;

pub const INI_FILE_NAME: &str = "OptiScaler.ini";

/// Token meaning "let the mod decide" for upscalers and frame generation.
pub const AUTO: &str = "auto";
/// `FGType` value that disables frame generation.
pub const FG_DISABLED: &str = "nofg";
pub const FG_OPTIFG: &str = "optifg";

pub const DEFAULT_PRESET_TOLERANCE: f32 = 0.1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpscalerSettings {
    pub dx11: String,
    pub dx12: String,
    pub vulkan: String,
}

impl Default for UpscalerSettings {
    fn default() -> Self {
        Self {
            dx11: AUTO.to_string(),
            dx12: AUTO.to_string(),
            vulkan: AUTO.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameGenSettings {
    pub fg_type: String,
}

impl Default for FrameGenSettings {
    fn default() -> Self {
        Self {
            fg_type: AUTO.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct OptiFgSettings {
    pub enabled: bool,
    pub debug_view: bool,
    pub allow_async: bool,
    pub hud_fix: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuSettings {
    pub overlay_menu: bool,
    pub scale: f32,
    /// Virtual-key code, VK_INSERT by default.
    pub shortcut_key: i32,
    pub show_fps: bool,
    pub fps_overlay_pos: i32,
}

impl Default for MenuSettings {
    fn default() -> Self {
        Self {
            overlay_menu: true,
            scale: 1.0,
            shortcut_key: 0x2D,
            show_fps: false,
            fps_overlay_pos: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DlssSettings {
    pub enabled: bool,
    pub library_path: Option<PathBuf>,
    pub render_preset_override: bool,
}

impl Default for DlssSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            library_path: None,
            render_preset_override: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FsrSettings {
    pub vertical_fov: f32,
    pub camera_near: f32,
    pub camera_far: f32,
    pub debug_view: bool,
    pub upscaler_index: i32,
}

impl Default for FsrSettings {
    fn default() -> Self {
        Self {
            vertical_fov: 60.0,
            camera_near: 0.1,
            camera_far: 10000.0,
            debug_view: false,
            upscaler_index: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct XessSettings {
    pub build_pipelines: bool,
    pub network_model: i32,
    pub library_path: Option<PathBuf>,
}

impl Default for XessSettings {
    fn default() -> Self {
        Self {
            build_pipelines: true,
            network_model: 0,
            library_path: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpoofingSettings {
    pub dxgi: bool,
    pub vendor_id: i32,
    pub device_id: i32,
    pub gpu_name: String,
}

impl Default for SpoofingSettings {
    fn default() -> Self {
        Self {
            dxgi: true,
            vendor_id: 0x10de,
            device_id: 0x2684,
            gpu_name: "NVIDIA GeForce RTX 4090".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QualityTier {
    Dlaa,
    UltraQuality,
    Quality,
    Balanced,
    Performance,
    UltraPerformance,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QualityPreset {
    pub label: &'static str,
    pub tier: QualityTier,
    pub ratio: f32,
}

/// Built-in presets, in the order they are matched.
pub const QUALITY_PRESETS: [QualityPreset; 6] = [
    QualityPreset { label: "Quality", tier: QualityTier::Quality, ratio: 1.5 },
    QualityPreset { label: "Balanced", tier: QualityTier::Balanced, ratio: 1.7 },
    QualityPreset { label: "Performance", tier: QualityTier::Performance, ratio: 2.0 },
    QualityPreset { label: "Ultra Quality", tier: QualityTier::UltraQuality, ratio: 1.3 },
    QualityPreset { label: "Ultra Performance", tier: QualityTier::UltraPerformance, ratio: 3.0 },
    QualityPreset { label: "DLAA", tier: QualityTier::Dlaa, ratio: 1.0 },
];

impl QualityPreset {
    pub fn matches(&self, ratio: f32, tolerance: f32) -> bool {
        (ratio - self.ratio).abs() < tolerance
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityOverrides {
    pub enabled: bool,
    pub dlaa: f32,
    pub ultra_quality: f32,
    pub quality: f32,
    pub balanced: f32,
    pub performance: f32,
    pub ultra_performance: f32,
}

impl Default for QualityOverrides {
    fn default() -> Self {
        Self {
            enabled: false,
            dlaa: 1.0,
            ultra_quality: 1.3,
            quality: 1.5,
            balanced: 1.7,
            performance: 2.0,
            ultra_performance: 3.0,
        }
    }
}

impl QualityOverrides {
    pub fn ratio(&self, tier: QualityTier) -> f32 {
        match tier {
            QualityTier::Dlaa => self.dlaa,
            QualityTier::UltraQuality => self.ultra_quality,
            QualityTier::Quality => self.quality,
            QualityTier::Balanced => self.balanced,
            QualityTier::Performance => self.performance,
            QualityTier::UltraPerformance => self.ultra_performance,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SharpnessSettings {
    pub override_enabled: bool,
    pub sharpness: f32,
}

impl Default for SharpnessSettings {
    fn default() -> Self {
        Self {
            override_enabled: false,
            sharpness: 0.3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CasSettings {
    pub enabled: bool,
    pub motion_sharpness_enabled: bool,
    pub motion_sharpness: f32,
}

impl Default for CasSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            motion_sharpness_enabled: false,
            motion_sharpness: 0.4,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogSettings {
    pub log_file: String,
    /// 0 = trace .. 4 = error
    pub log_level: i32,
    pub log_to_file: bool,
    pub log_to_console: bool,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            log_file: "OptiScaler.log".to_string(),
            log_level: 2,
            log_to_file: false,
            log_to_console: false,
        }
    }
}

/// Parsed `OptiScaler.ini`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ModConfig {
    pub upscalers: UpscalerSettings,
    pub frame_gen: FrameGenSettings,
    pub opti_fg: OptiFgSettings,
    pub menu: MenuSettings,
    pub dlss: DlssSettings,
    pub fsr: FsrSettings,
    pub xess: XessSettings,
    pub spoofing: SpoofingSettings,
    pub quality: QualityOverrides,
    pub sharpness: SharpnessSettings,
    pub cas: CasSettings,
    pub log: LogSettings,
}

impl ModConfig {
    /// Strict load: fails if the file is missing, unreadable or not INI at all.
    /// Individual bad values still fall back to their defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content).map_err(|message| ConfigError::Parse {
            path: path.to_path_buf(),
            message,
        })
    }

    pub fn parse(content: &str) -> Result<Self, String> {
        let opt = ParseOption {
            enabled_quote: false,
            enabled_escape: false,
            ..ParseOption::default()
        };
        let ini = Ini::load_from_str_opt(&strip_stray_lines(content), opt)
            .map_err(|e| e.to_string())?;
        Ok(Self::from_ini(&ini))
    }

    fn from_ini(ini: &Ini) -> Self {
        let mut cfg = ModConfig::default();
        let r = IniReader { ini };

        r.string("Upscalers", "Dx11Upscaler", &mut cfg.upscalers.dx11);
        r.string("Upscalers", "Dx12Upscaler", &mut cfg.upscalers.dx12);
        r.string("Upscalers", "VulkanUpscaler", &mut cfg.upscalers.vulkan);

        r.string("FrameGen", "FGType", &mut cfg.frame_gen.fg_type);

        r.boolean("OptiFG", "Enabled", &mut cfg.opti_fg.enabled);
        r.boolean("OptiFG", "DebugView", &mut cfg.opti_fg.debug_view);
        r.boolean("OptiFG", "AllowAsync", &mut cfg.opti_fg.allow_async);
        r.boolean("OptiFG", "HUDFix", &mut cfg.opti_fg.hud_fix);

        r.boolean("Menu", "OverlayMenu", &mut cfg.menu.overlay_menu);
        r.float("Menu", "Scale", &mut cfg.menu.scale);
        r.int("Menu", "ShortcutKey", &mut cfg.menu.shortcut_key);
        r.boolean("Menu", "ShowFps", &mut cfg.menu.show_fps);
        r.int("Menu", "FpsOverlayPos", &mut cfg.menu.fps_overlay_pos);

        r.boolean("DLSS", "Enabled", &mut cfg.dlss.enabled);
        r.path("DLSS", "LibraryPath", &mut cfg.dlss.library_path);
        r.boolean("DLSS", "RenderPresetOverride", &mut cfg.dlss.render_preset_override);

        r.float("FSR", "VerticalFov", &mut cfg.fsr.vertical_fov);
        r.float("FSR", "CameraNear", &mut cfg.fsr.camera_near);
        r.float("FSR", "CameraFar", &mut cfg.fsr.camera_far);
        r.boolean("FSR", "DebugView", &mut cfg.fsr.debug_view);
        r.int("FSR", "UpscalerIndex", &mut cfg.fsr.upscaler_index);

        r.boolean("XeSS", "BuildPipelines", &mut cfg.xess.build_pipelines);
        r.int("XeSS", "NetworkModel", &mut cfg.xess.network_model);
        r.path("XeSS", "LibraryPath", &mut cfg.xess.library_path);

        r.boolean("Spoofing", "Dxgi", &mut cfg.spoofing.dxgi);
        r.int("Spoofing", "SpoofedVendorId", &mut cfg.spoofing.vendor_id);
        r.int("Spoofing", "SpoofedDeviceId", &mut cfg.spoofing.device_id);
        r.string("Spoofing", "SpoofedGPUName", &mut cfg.spoofing.gpu_name);

        r.boolean("QualityOverrides", "QualityRatioOverrideEnabled", &mut cfg.quality.enabled);
        r.float("QualityOverrides", "QualityRatioDLAA", &mut cfg.quality.dlaa);
        r.float("QualityOverrides", "QualityRatioUltraQuality", &mut cfg.quality.ultra_quality);
        r.float("QualityOverrides", "QualityRatioQuality", &mut cfg.quality.quality);
        r.float("QualityOverrides", "QualityRatioBalanced", &mut cfg.quality.balanced);
        r.float("QualityOverrides", "QualityRatioPerformance", &mut cfg.quality.performance);
        r.float(
            "QualityOverrides",
            "QualityRatioUltraPerformance",
            &mut cfg.quality.ultra_performance,
        );

        r.boolean("Sharpness", "OverrideSharpness", &mut cfg.sharpness.override_enabled);
        r.float("Sharpness", "Sharpness", &mut cfg.sharpness.sharpness);

        r.boolean("CAS", "Enabled", &mut cfg.cas.enabled);
        r.boolean("CAS", "MotionSharpnessEnabled", &mut cfg.cas.motion_sharpness_enabled);
        r.float("CAS", "MotionSharpness", &mut cfg.cas.motion_sharpness);

        r.string("Log", "LogFile", &mut cfg.log.log_file);
        r.int("Log", "LogLevel", &mut cfg.log.log_level);
        r.boolean("Log", "LogToFile", &mut cfg.log.log_to_file);
        r.boolean("Log", "LogToConsole", &mut cfg.log.log_to_console);

        cfg
    }

    fn to_ini(&self) -> Ini {
        let mut ini = Ini::new();

        ini.with_section(Some("Upscalers"))
            .set("Dx11Upscaler", self.upscalers.dx11.as_str())
            .set("Dx12Upscaler", self.upscalers.dx12.as_str())
            .set("VulkanUpscaler", self.upscalers.vulkan.as_str());

        ini.with_section(Some("FrameGen"))
            .set("FGType", self.frame_gen.fg_type.as_str());

        ini.with_section(Some("OptiFG"))
            .set("Enabled", fmt_bool(self.opti_fg.enabled))
            .set("DebugView", fmt_bool(self.opti_fg.debug_view))
            .set("AllowAsync", fmt_bool(self.opti_fg.allow_async))
            .set("HUDFix", fmt_bool(self.opti_fg.hud_fix));

        ini.with_section(Some("Menu"))
            .set("OverlayMenu", fmt_bool(self.menu.overlay_menu))
            .set("Scale", self.menu.scale.to_string())
            .set("ShortcutKey", self.menu.shortcut_key.to_string())
            .set("ShowFps", fmt_bool(self.menu.show_fps))
            .set("FpsOverlayPos", self.menu.fps_overlay_pos.to_string());

        ini.with_section(Some("DLSS"))
            .set("Enabled", fmt_bool(self.dlss.enabled))
            .set("LibraryPath", fmt_path(&self.dlss.library_path))
            .set("RenderPresetOverride", fmt_bool(self.dlss.render_preset_override));

        ini.with_section(Some("FSR"))
            .set("VerticalFov", self.fsr.vertical_fov.to_string())
            .set("CameraNear", self.fsr.camera_near.to_string())
            .set("CameraFar", self.fsr.camera_far.to_string())
            .set("DebugView", fmt_bool(self.fsr.debug_view))
            .set("UpscalerIndex", self.fsr.upscaler_index.to_string());

        ini.with_section(Some("XeSS"))
            .set("BuildPipelines", fmt_bool(self.xess.build_pipelines))
            .set("NetworkModel", self.xess.network_model.to_string())
            .set("LibraryPath", fmt_path(&self.xess.library_path));

        ini.with_section(Some("Spoofing"))
            .set("Dxgi", fmt_bool(self.spoofing.dxgi))
            .set("SpoofedVendorId", self.spoofing.vendor_id.to_string())
            .set("SpoofedDeviceId", self.spoofing.device_id.to_string())
            .set("SpoofedGPUName", self.spoofing.gpu_name.as_str());

        ini.with_section(Some("QualityOverrides"))
            .set("QualityRatioOverrideEnabled", fmt_bool(self.quality.enabled))
            .set("QualityRatioDLAA", self.quality.dlaa.to_string())
            .set("QualityRatioUltraQuality", self.quality.ultra_quality.to_string())
            .set("QualityRatioQuality", self.quality.quality.to_string())
            .set("QualityRatioBalanced", self.quality.balanced.to_string())
            .set("QualityRatioPerformance", self.quality.performance.to_string())
            .set("QualityRatioUltraPerformance", self.quality.ultra_performance.to_string());

        ini.with_section(Some("Sharpness"))
            .set("OverrideSharpness", fmt_bool(self.sharpness.override_enabled))
            .set("Sharpness", self.sharpness.sharpness.to_string());

        ini.with_section(Some("CAS"))
            .set("Enabled", fmt_bool(self.cas.enabled))
            .set("MotionSharpnessEnabled", fmt_bool(self.cas.motion_sharpness_enabled))
            .set("MotionSharpness", self.cas.motion_sharpness.to_string());

        ini.with_section(Some("Log"))
            .set("LogFile", self.log.log_file.as_str())
            .set("LogLevel", self.log.log_level.to_string())
            .set("LogToFile", fmt_bool(self.log.log_to_file))
            .set("LogToConsole", fmt_bool(self.log.log_to_console));

        ini
    }

    /// Serializes to INI text.
    pub fn to_ini_string(&self) -> String {
        let mut buf = Vec::new();
        // Writing into a Vec cannot fail.
        let _ = self.to_ini().write_to_opt(&mut buf, write_option());
        String::from_utf8_lossy(&buf).into_owned()
    }

    /// First non-`auto` upscaler, checking DX12, DX11 then Vulkan.
    pub fn primary_upscaler(&self) -> &str {
        [&self.upscalers.dx12, &self.upscalers.dx11, &self.upscalers.vulkan]
            .into_iter()
            .find(|u| !u.eq_ignore_ascii_case(AUTO))
            .map(String::as_str)
            .unwrap_or(AUTO)
    }

    pub fn upscaler_display_name(&self) -> String {
        upscaler_label(self.primary_upscaler())
    }

    pub fn frame_generation_enabled(&self) -> bool {
        !self.frame_gen.fg_type.eq_ignore_ascii_case(FG_DISABLED)
    }

    /// Named quality preset for the current ratio overrides.
    ///
    /// `Default` when overrides are off. Otherwise the first preset (in
    /// `QUALITY_PRESETS` order) whose tier ratio is within `tolerance`, or `Custom`.
    pub fn quality_preset_label(&self, tolerance: f32) -> &'static str {
        if !self.quality.enabled {
            return "Default";
        }
        QUALITY_PRESETS
            .iter()
            .find(|p| p.matches(self.quality.ratio(p.tier), tolerance))
            .map(|p| p.label)
            .unwrap_or("Custom")
    }

    /// Uses `token` for every graphics API.
    pub fn set_upscaler(&mut self, token: &str) {
        let token = token.to_ascii_lowercase();
        self.upscalers.dx11 = token.clone();
        self.upscalers.dx12 = token.clone();
        self.upscalers.vulkan = token;
    }

    pub fn set_frame_generation(&mut self, enabled: bool) {
        self.opti_fg.enabled = enabled;
        self.frame_gen.fg_type = if enabled { FG_OPTIFG } else { FG_DISABLED }.to_string();
    }
}

/// Display label for an internal upscaler token.
pub fn upscaler_label(token: &str) -> String {
    match token.to_ascii_lowercase().as_str() {
        "dlss" => "DLSS".to_string(),
        "xess" => "XeSS".to_string(),
        "fsr21" => "FSR 2.1".to_string(),
        "fsr22" => "FSR 2.2".to_string(),
        "fsr31" => "FSR 3.1".to_string(),
        "auto" => "Auto".to_string(),
        _ => token.to_uppercase(),
    }
}

/// Reads `path`, falling back to defaults for anything missing or broken.
pub fn read_config(path: &Path) -> ModConfig {
    match ModConfig::load(path) {
        Ok(cfg) => cfg,
        Err(e) if e.is_not_found() => {
            debug!("{} not found, using defaults", path.display());
            ModConfig::default()
        }
        Err(e) => {
            warn!("{}", e);
            ModConfig::default()
        }
    }
}

/// Overwrites `path` with `config`, creating parent directories.
pub fn write_config(path: &Path, config: &ModConfig) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent).map_err(|source| ConfigError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
    }
    config
        .to_ini()
        .write_to_file_opt(path, write_option())
        .map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })
}

fn write_option() -> WriteOption {
    WriteOption {
        escape_policy: ini::EscapePolicy::Nothing,
        ..WriteOption::default()
    }
}

fn fmt_bool(v: bool) -> &'static str {
    if v {
        "true"
    } else {
        "false"
    }
}

fn fmt_path(p: &Option<PathBuf>) -> String {
    p.as_ref()
        .map(|p| p.to_string_lossy().into_owned())
        .unwrap_or_else(|| AUTO.to_string())
}

/// Drops lines that are neither a header, a comment nor a `key=value` pair.
///
/// `rust-ini` reads such a line as a key and keeps consuming until it finds a
/// separator, which can swallow the next `[Section]` header.
fn strip_stray_lines(content: &str) -> String {
    let mut kept = String::with_capacity(content.len());
    for line in content.lines() {
        let t = line.trim();
        let stray = !t.is_empty()
            && !t.starts_with(';')
            && !t.starts_with('#')
            && !t.starts_with('[')
            && !t.contains('=')
            && !t.contains(':');
        if stray {
            debug!("ignoring stray line in OptiScaler.ini: {}", t);
            continue;
        }
        kept.push_str(line);
        kept.push('\n');
    }
    kept
}

struct IniReader<'a> {
    ini: &'a Ini,
}

impl IniReader<'_> {
    fn value(&self, section: &str, key: &str) -> Option<&str> {
        self.ini.get_from(Some(section), key).map(str::trim)
    }

    /// Like `value`, but an empty entry counts as missing.
    fn raw(&self, section: &str, key: &str) -> Option<&str> {
        self.value(section, key).filter(|v| !v.is_empty())
    }

    fn string(&self, section: &str, key: &str, field: &mut String) {
        if let Some(v) = self.value(section, key) {
            *field = v.to_string();
        }
    }

    fn boolean(&self, section: &str, key: &str, field: &mut bool) {
        if let Some(v) = self.raw(section, key) {
            match parse_bool(v) {
                Some(b) => *field = b,
                None => debug!("[{}] {}={} is not a boolean, keeping default", section, key, v),
            }
        }
    }

    fn float(&self, section: &str, key: &str, field: &mut f32) {
        if let Some(v) = self.raw(section, key) {
            match v.parse::<f32>() {
                Ok(f) if f.is_finite() => *field = f,
                _ => debug!("[{}] {}={} is not a number, keeping default", section, key, v),
            }
        }
    }

    fn int(&self, section: &str, key: &str, field: &mut i32) {
        if let Some(v) = self.raw(section, key) {
            match parse_int(v) {
                Some(i) => *field = i,
                None => debug!("[{}] {}={} is not an integer, keeping default", section, key, v),
            }
        }
    }

    fn path(&self, section: &str, key: &str, field: &mut Option<PathBuf>) {
        if let Some(v) = self.raw(section, key) {
            *field = if v.eq_ignore_ascii_case(AUTO) {
                None
            } else {
                Some(PathBuf::from(v))
            };
        }
    }
}

fn parse_bool(v: &str) -> Option<bool> {
    match v.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn parse_int(v: &str) -> Option<i32> {
    let lower = v.to_ascii_lowercase();
    match lower.strip_prefix("0x") {
        Some(hex) => i32::from_str_radix(hex, 16).ok(),
        None => lower.parse().ok(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_hex_and_decimal_ints() {
        assert_eq!(parse_int("0x10de"), Some(0x10de));
        assert_eq!(parse_int("0X2D"), Some(0x2d));
        assert_eq!(parse_int("42"), Some(42));
        assert_eq!(parse_int("auto"), None);
    }

    #[test]
    fn bad_values_keep_defaults() {
        let cfg = ModConfig::parse(
            "[Menu]\nScale=huge\nShowFps=maybe\n[FSR]\nCameraFar=5000\n",
        )
        .unwrap();
        assert_eq!(cfg.menu.scale, 1.0);
        assert!(!cfg.menu.show_fps);
        assert_eq!(cfg.fsr.camera_far, 5000.0);
    }

    #[test]
    fn keys_are_case_insensitive() {
        let cfg = ModConfig::parse("[upscalers]\ndx12upscaler=xess\n").unwrap();
        assert_eq!(cfg.upscalers.dx12, "xess");
    }

    #[test]
    fn windows_paths_survive_without_escaping() {
        let mut cfg = ModConfig::default();
        cfg.dlss.library_path = Some(PathBuf::from(r"C:\Games\nvngx_dlss.dll"));
        let text = cfg.to_ini_string();
        let back = ModConfig::parse(&text).unwrap();
        assert_eq!(back.dlss.library_path, cfg.dlss.library_path);
        assert_eq!(back.xess.library_path, None);
    }

    #[test]
    fn primary_upscaler_prefers_dx12() {
        let mut cfg = ModConfig::default();
        assert_eq!(cfg.primary_upscaler(), "auto");
        cfg.upscalers.vulkan = "fsr22".into();
        assert_eq!(cfg.primary_upscaler(), "fsr22");
        cfg.upscalers.dx11 = "xess".into();
        assert_eq!(cfg.primary_upscaler(), "xess");
        cfg.upscalers.dx12 = "dlss".into();
        assert_eq!(cfg.upscaler_display_name(), "DLSS");
    }

    #[test]
    fn unknown_upscaler_tokens_are_uppercased() {
        assert_eq!(upscaler_label("fsr31"), "FSR 3.1");
        assert_eq!(upscaler_label("fsr4"), "FSR4");
    }

    #[test]
    fn frame_generation_only_off_for_nofg() {
        let mut cfg = ModConfig::default();
        assert!(cfg.frame_generation_enabled());
        cfg.set_frame_generation(false);
        assert!(!cfg.frame_generation_enabled());
        cfg.frame_gen.fg_type = "NoFG".into();
        assert!(!cfg.frame_generation_enabled());
        cfg.set_frame_generation(true);
        assert!(cfg.frame_generation_enabled());
        assert!(cfg.opti_fg.enabled);
    }

    #[test]
    fn preset_matching_uses_tolerance() {
        let balanced = QUALITY_PRESETS[1];
        assert!(balanced.matches(1.75, 0.1));
        assert!(!balanced.matches(1.45, 0.1));
        assert!(balanced.matches(1.45, 0.3));
    }
}
