use bildhatch_core::{HatchParamSet, HatchPattern, MaterialPalette, PostProcessingMode, Rgb};

#[test]
fn test_palette_loads_with_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("maple.json");
    std::fs::write(
        &path,
        r#"{
            "name": "diode / maple / raw",
            "entries": [
                {
                    "color": { "r": 0, "g": 0, "b": 0 },
                    "hatch_distance_um": 80,
                    "hatch_pattern": "CrossedMeander",
                    "hatch_angle": 30,
                    "laser_power": 90,
                    "speed": 40
                }
            ]
        }"#,
    )
    .unwrap();

    let palette = MaterialPalette::load_from_file(&path).unwrap();
    assert_eq!(palette.post_processing, PostProcessingMode::None);
    assert!(palette.air_assist);
    assert_eq!(palette.enclosure_fan, 100);

    let entry: &HatchParamSet = palette.find_paramset_by_color(Rgb::new(40, 40, 40)).unwrap();
    assert_eq!(entry.hatch_pattern, HatchPattern::CrossedMeander);
    assert_eq!(entry.hatch_distance_um, 80.0);
}

#[test]
fn test_missing_palette_file_is_io_error() {
    let err = MaterialPalette::load_from_file(std::path::Path::new("/nonexistent/palette.json"))
        .unwrap_err();
    assert!(matches!(err, bildhatch_core::Error::Io(_)));
}
