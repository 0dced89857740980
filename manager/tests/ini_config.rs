use std::fs;
use std::path::PathBuf;

use optiscaler_manager::ini_config::{DEFAULT_PRESET_TOLERANCE, INI_FILE_NAME};
use optiscaler_manager::{read_config, write_config, ModConfig};

#[test]
fn explicit_values_survive_a_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("Game").join("Binaries").join(INI_FILE_NAME);

    let mut cfg = ModConfig::default();
    cfg.set_upscaler("fsr31");
    cfg.set_frame_generation(true);
    cfg.opti_fg.hud_fix = true;
    cfg.menu.scale = 1.25;
    cfg.menu.shortcut_key = 0x70;
    cfg.dlss.library_path = Some(PathBuf::from(r"C:\Tools\DLSS 3.7\nvngx_dlss.dll"));
    cfg.fsr.vertical_fov = 75.5;
    cfg.xess.network_model = 3;
    cfg.spoofing.gpu_name = "AMD Radeon RX 7900 XTX".to_string();
    cfg.spoofing.vendor_id = 0x1002;
    cfg.quality.enabled = true;
    cfg.quality.balanced = 1.8;
    cfg.sharpness.override_enabled = true;
    cfg.sharpness.sharpness = 0.65;
    cfg.cas.motion_sharpness = 0.2;
    cfg.log.log_level = 0;
    cfg.log.log_to_file = true;

    write_config(&path, &cfg).unwrap();
    assert_eq!(read_config(&path), cfg);
}

#[test]
fn defaults_round_trip_and_are_written_in_full() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(INI_FILE_NAME);

    write_config(&path, &ModConfig::default()).unwrap();
    let text = fs::read_to_string(&path).unwrap();
    for line in [
        "[Upscalers]",
        "Dx12Upscaler=auto",
        "[Menu]",
        "ShortcutKey=45",
        "[DLSS]",
        "LibraryPath=auto",
        "[QualityOverrides]",
        "QualityRatioOverrideEnabled=false",
        "[Log]",
        "LogFile=OptiScaler.log",
    ] {
        assert!(text.lines().any(|l| l.trim() == line), "missing `{}` in\n{}", line, text);
    }
    assert_eq!(read_config(&path), ModConfig::default());
}

#[test]
fn missing_file_reads_as_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = read_config(&dir.path().join("nope").join(INI_FILE_NAME));
    assert_eq!(cfg, ModConfig::default());
}

#[test]
fn hand_edited_file_is_read_leniently() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(INI_FILE_NAME);
    fs::write(
        &path,
        "; OptiScaler settings\n\
         [upscalers]\n\
         dx11upscaler = xess\n\
         SomeFutureKey=1\n\
         [Spoofing]\n\
         SpoofedVendorId=0x1002\n\
         SpoofedDeviceId=not-a-number\n\
         [OptiFG]\n\
         Enabled=1\n\
         HUDFix=yes\n\
         [XeSS]\n\
         LibraryPath=D:\\XeSS\\libxess.dll\n\
         [Unknown]\n\
         Whatever=true\n",
    )
    .unwrap();

    let cfg = read_config(&path);
    assert_eq!(cfg.upscalers.dx11, "xess");
    assert_eq!(cfg.upscalers.dx12, "auto");
    assert_eq!(cfg.spoofing.vendor_id, 0x1002);
    assert_eq!(cfg.spoofing.device_id, ModConfig::default().spoofing.device_id);
    assert!(cfg.opti_fg.enabled);
    assert!(cfg.opti_fg.hud_fix);
    assert_eq!(cfg.xess.library_path, Some(PathBuf::from(r"D:\XeSS\libxess.dll")));
    assert_eq!(cfg.upscaler_display_name(), "XeSS");
}

#[test]
fn balanced_ratio_names_the_balanced_preset() {
    let mut cfg = ModConfig::default();
    assert_eq!(cfg.quality_preset_label(DEFAULT_PRESET_TOLERANCE), "Default");

    cfg.quality.enabled = true;
    cfg.quality.quality = 1.2;
    cfg.quality.balanced = 1.7;
    assert_eq!(cfg.quality_preset_label(DEFAULT_PRESET_TOLERANCE), "Balanced");
}

#[test]
fn ratio_between_presets_is_custom() {
    let mut cfg = ModConfig::default();
    cfg.quality.enabled = true;
    cfg.quality.quality = 1.2;
    cfg.quality.balanced = 1.45;
    cfg.quality.performance = 2.5;
    cfg.quality.ultra_quality = 1.1;
    cfg.quality.ultra_performance = 3.5;
    cfg.quality.dlaa = 0.8;
    assert_eq!(cfg.quality_preset_label(DEFAULT_PRESET_TOLERANCE), "Custom");

    // A wider tolerance pulls 1.45 back into Balanced
    assert_eq!(cfg.quality_preset_label(0.26), "Balanced");
}

#[test]
fn stock_overrides_report_quality_first() {
    let mut cfg = ModConfig::default();
    cfg.quality.enabled = true;
    assert_eq!(cfg.quality_preset_label(DEFAULT_PRESET_TOLERANCE), "Quality");
}

#[test]
fn stray_line_does_not_swallow_next_section() {
    let cfg = ModConfig::parse(
        "[Upscalers]\nDx12Upscaler=dlss\ngarbage\n[Menu]\nScale=1.5\n; trailing note\n",
    )
    .unwrap();
    assert_eq!(cfg.upscalers.dx12, "dlss");
    assert_eq!(cfg.menu.scale, 1.5);
}

#[test]
fn empty_strings_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(INI_FILE_NAME);

    let mut cfg = ModConfig::default();
    cfg.spoofing.gpu_name = String::new();
    cfg.log.log_file = String::new();

    write_config(&path, &cfg).unwrap();
    assert_eq!(read_config(&path), cfg);
}
