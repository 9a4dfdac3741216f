//! API regression tests for the relief crates.
//!
//! Organized in tiers that follow the pipeline:
//!
//! - Tier 1: Foundation (colors, layer stacks, pixel buffers)
//! - Tier 2: Palette extraction
//! - Tier 3: Height mapping and solids
//! - Tier 4: Layer changes and export
//! - Tier 5: The end-to-end pipeline
//!
//! A failure here after an API change is a breaking change that needs a
//! version bump.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::float_cmp)]
#![allow(clippy::uninlined_format_args)]

use relief::prelude::*;
use relief::{export, height, palette, solid, types};

fn portrait() -> PixelBuffer {
    PixelBuffer::from_fn(96, 64, |x, y| {
        if y < 16 {
            [20, 20, 24, 255]
        } else if x < 48 {
            [200, 40, 40, 255]
        } else {
            let v = u8::try_from(120 + x).unwrap();
            [v, v, 250, 255]
        }
    })
}

// =============================================================================
// TIER 1: Foundation
// =============================================================================

mod tier1_foundation {
    use super::*;

    #[test]
    fn rgb_hex_round_trip() {
        let c = Rgb::from_hex("#C81E1E").unwrap();
        assert_eq!(c, Rgb::new(200, 30, 30));
        assert_eq!(c.to_hex(), "#c81e1e");
        assert!(Rgb::from_hex("c81e").is_err());
    }

    #[test]
    fn default_stack_is_valid() {
        let stack = LayerStack::default();
        assert_eq!(stack.len(), 5);
        assert_eq!(stack.layers().last().unwrap().height_fraction(), 1.0);
    }

    #[test]
    fn stack_edits_keep_the_original() {
        let stack = LayerStack::default();
        let added = stack
            .apply(LayerEdit::AddLayer {
                color: Rgb::new(255, 0, 0),
                transmission_distance: 1.2,
            })
            .unwrap();
        assert_eq!(stack.len(), 5);
        assert_eq!(added.len(), 6);
        assert_eq!(added.layers().last().unwrap().color(), Rgb::new(255, 0, 0));

        let moved = stack
            .apply(LayerEdit::MoveDivider {
                index: 1,
                fraction: 0.45,
            })
            .unwrap();
        assert!((moved.layers()[1].height_fraction() - 0.45).abs() < 1e-9);

        assert!(stack.apply(LayerEdit::RemoveLayer { index: 5 }).is_err());
    }

    #[test]
    fn pixel_buffer_rejects_short_data() {
        assert!(types::PixelBuffer::new(2, 2, vec![0; 15]).is_err());
        assert!(types::PixelBuffer::new(2, 2, vec![0; 16]).is_ok());
    }
}

// =============================================================================
// TIER 2: Palette
// =============================================================================

mod tier2_palette {
    use super::*;

    #[test]
    fn extracted_fractions_increase_to_one() {
        for count in 2..=8 {
            let stack = palette::extract_palette(&portrait(), &PaletteParams::with_color_count(count));
            let fractions: Vec<f64> = stack.iter().map(LayerSpec::height_fraction).collect();
            assert!(fractions.windows(2).all(|w| w[0] < w[1]), "{count}: {fractions:?}");
            assert_eq!(*fractions.last().unwrap(), 1.0);
        }
    }

    #[test]
    fn single_color_keeps_its_color_at_both_ends() {
        let image = PixelBuffer::filled(12, 12, [41, 163, 90, 255]);
        let stack = palette::extract_palette(&image, &PaletteParams::with_color_count(2));
        let colors = stack.colors();
        assert_eq!(colors.first(), Some(&Rgb::new(41, 163, 90)));
        assert_eq!(colors.last(), Some(&Rgb::new(41, 163, 90)));
    }

    #[test]
    fn patterns_have_names_and_stacks() {
        let image = portrait();
        for pattern in [
            PalettePattern::default(),
            PalettePattern::GrayscaleFixed,
            PalettePattern::GrayscaleDistributed,
            PalettePattern::Posterized,
        ] {
            assert!(!pattern.name().is_empty());
            assert!(pattern.generate(&image).len() >= 2, "{}", pattern.name());
        }
    }
}

// =============================================================================
// TIER 3: Heights and solids
// =============================================================================

mod tier3_geometry {
    use super::*;

    #[test]
    fn square_surface_has_r_squared_vertices() {
        let field = |_: f64, _: f64| 1.0;
        let surface = SolidBuilder::new(&field, 64, 64)
            .resolution(20)
            .build_surface()
            .unwrap();
        assert_eq!(surface.vertex_count(), 400);
        assert_eq!(surface.face_count(), 2 * 19 * 19);
    }

    #[test]
    fn flat_slab_is_a_closed_box() {
        let (h, t) = (1.5, 0.4);
        let field = move |_: f64, _: f64| h;
        let result = SolidBuilder::new(&field, 80, 40)
            .resolution(30)
            .max_dimension(60.0)
            .base_thickness(t)
            .build()
            .unwrap();

        let stats = result.stats;
        assert_eq!(
            result.mesh.face_count(),
            stats.surface_faces + stats.wall_faces + stats.cap_faces
        );

        let report = validate_solid(&result.mesh);
        assert!(report.is_watertight(), "{report}");
        assert!(report.is_manifold(), "{report}");

        let size = result.mesh.bounds().size();
        assert!((size.x - 60.0).abs() < 1e-9);
        assert!((size.y - 30.0).abs() < 1e-9);
        assert!((size.z - (h + t)).abs() < 1e-9);
    }

    #[test]
    fn mapper_heights_stay_in_range() {
        let image = portrait();
        let stack = PalettePattern::default().generate(&image);
        let mapper = height::HeightMapper::new(&image, &stack, HeightParams::default());
        for color in stack.colors() {
            let h = mapper.height_for_color(color);
            assert!((0.0..=2.0).contains(&h), "{color}: {h}");
        }
    }

    #[test]
    fn empty_image_is_rejected() {
        let field = |_: f64, _: f64| 0.0;
        let err = SolidBuilder::new(&field, 0, 10).build().unwrap_err();
        assert!(matches!(err, solid::SolidError::EmptyImage { .. }));
    }
}

// =============================================================================
// TIER 4: Layer changes and export
// =============================================================================

mod tier4_export {
    use super::*;

    #[test]
    fn half_height_changes_at_layer_13() {
        let calc = export::LayerChangeCalculator::with_layer_count(0.08, 0.16, 25);
        assert_eq!(calc.layer_index(0.5), 13);
        assert!((calc.z_for_layer(13) - 1.12).abs() < 1e-9);
    }

    #[test]
    fn targets_parse_and_name_files() {
        for target in ExportTarget::ALL {
            assert_eq!(target.name().parse::<ExportTarget>().unwrap(), target);
            assert!(target.file_suffix().starts_with('.'));
        }
        assert!("obj".parse::<ExportTarget>().is_err());
    }

    #[test]
    fn invalid_settings_are_rejected() {
        let mesh = IndexedMesh::new();
        let stack = LayerStack::default();
        let request = export::ExportRequest::new(&mesh, &stack);
        let err = export::export_bytes(ExportTarget::Stl, &request).unwrap_err();
        assert!(matches!(err, export::ExportError::InvalidMesh { .. }));

        let request = request.settings(PrintSettings::with_layer_height(0.0));
        assert!(export::export_bytes(ExportTarget::Stl, &request).is_err());
    }
}

// =============================================================================
// TIER 5: Pipeline
// =============================================================================

mod tier5_pipeline {
    use super::*;

    fn params() -> ReliefParams {
        let mut params = ReliefParams::preview();
        params.export = ExportOptions::reproducible("2024-03-01");
        params
    }

    #[test]
    fn every_target_exports() {
        let image = portrait();
        let relief = Relief::new(&image, params());
        for (target, bytes) in relief.export_all(&ExportTarget::ALL) {
            let bytes = bytes.unwrap();
            match target {
                ExportTarget::Stl => assert_eq!(bytes.len() % 50, 34),
                _ => assert_eq!(&bytes[..2], b"PK"),
            }
        }
    }

    #[test]
    fn repeated_exports_are_identical() {
        let image = portrait();
        let relief = Relief::new(&image, params());
        for target in ExportTarget::ALL {
            assert_eq!(relief.export(target).unwrap(), relief.export(target).unwrap(), "{target}");
        }
    }

    #[test]
    fn resolution_does_not_change_the_footprint() {
        let image = portrait();
        let coarse = Relief::new(&image, params().with_resolution(60));
        let fine = Relief::new(&image, params().with_resolution(120));

        let a = coarse.build_solid().unwrap();
        let b = fine.build_solid().unwrap();
        let (sa, sb) = (a.mesh.bounds().size(), b.mesh.bounds().size());
        assert!((sa.x - sb.x).abs() < 1e-9);
        assert!((sa.y - sb.y).abs() < 1e-9);
        assert!(b.mesh.face_count() > a.mesh.face_count());
    }

    #[test]
    fn base_thickness_reaches_the_solid() {
        let image = portrait();
        let thick = params().with_print(PrintSettings::default().base_thickness(1.0));
        let solid = Relief::new(&image, thick).build_solid().unwrap();
        assert!((solid.mesh.bounds().min.z + 1.0).abs() < 1e-9);
    }

    #[test]
    fn files_land_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let image = portrait();
        let relief = Relief::new(&image, params());
        let path = dir.path().join("relief.prusa.3mf");
        relief.export_to_path(ExportTarget::Prusa3mf, &path).unwrap();
        assert_eq!(ExportTarget::from_path(&path), Some(ExportTarget::Prusa3mf));
        assert!(std::fs::metadata(&path).unwrap().len() > 0);
    }
}
