//! Loading generated fonts end to end

use std::sync::Arc;

use ttrast_core::{BudgetAllocator, Host, OutlineConfig, Point, Segment, Tag, TtError};
use ttrast_sfnt::builder::{
    self, CmapFormat, ComponentSpec, ComponentTransform, FontBuilder, GlyphSpec,
};
use ttrast_sfnt::directory::OPENTYPE_CFF_MAGIC;
use ttrast_sfnt::{Font, FontOptions};

fn square(x: f32, y: f32, size: f32) -> Vec<Point> {
    vec![
        Point::on(x, y),
        Point::on(x, y + size),
        Point::on(x + size, y + size),
        Point::on(x + size, y),
    ]
}

fn basic_font() -> FontBuilder {
    FontBuilder::new(1000)
        .vertical_metrics(800, -200, 100)
        .glyph(GlyphSpec::Empty { advance: 500 })
        .glyph(GlyphSpec::simple(vec![square(100.0, 0.0, 500.0)], 700))
        .glyph(GlyphSpec::Empty { advance: 250 })
        .map_char('A', 1)
        .map_char(' ', 2)
}

/// `depth` composites stacked on a square; the outermost is the last glyph
fn composite_chain(depth: u16) -> FontBuilder {
    let mut builder =
        FontBuilder::new(1000).glyph(GlyphSpec::simple(vec![square(0.0, 0.0, 100.0)], 100));
    for i in 0..depth {
        builder = builder.glyph(GlyphSpec::composite(
            vec![ComponentSpec::offset(i, 10, 0)],
            100,
        ));
    }
    builder
}

#[test]
fn test_load_and_query() {
    let data = basic_font().build();
    let font = Font::new(&data).unwrap();

    assert_eq!(font.num_glyphs(), 3);
    let vm = font.vertical_metrics();
    assert_eq!((vm.ascent, vm.descent, vm.line_gap), (800, -200, 100));
    assert_eq!(font.glyph_index('A').unwrap(), Some(1));
    assert_eq!(font.glyph_index(' ').unwrap(), Some(2));
    assert_eq!(font.glyph_metrics(1).unwrap().advance_width, 700);
    assert_eq!(font.glyph_metrics(1).unwrap().left_side_bearing, 100);
    assert!(font.is_glyph_empty(2).unwrap());

    let bounds = font.glyph_box(1).unwrap().unwrap();
    assert_eq!((bounds.x_min, bounds.y_max), (100.0, 500.0));
    assert_eq!(font.outline(1).unwrap().bounds(), Some(bounds));
    assert_eq!(font.glyph_box(0).unwrap(), None);
}

#[test]
fn test_empty_glyph_has_empty_outline() {
    let data = basic_font().build();
    let font = Font::new(&data).unwrap();
    let outline = font.outline(2).unwrap();
    assert!(outline.is_empty());
    assert_eq!(outline.ensure_drawable(2), Err(TtError::DegenerateGlyph(2)));
}

#[test]
fn test_glyph_out_of_range() {
    let data = basic_font().build();
    let font = Font::new(&data).unwrap();
    assert_eq!(
        font.outline(3),
        Err(TtError::GlyphOutOfRange { glyph: 3, count: 3 })
    );
    assert!(font.glyph_metrics(40).is_err());
}

#[test]
fn test_short_and_long_loca_agree() {
    let short = basic_font().build();
    let long = basic_font().long_loca(true).build();
    let a = Font::new(&short).unwrap();
    let b = Font::new(&long).unwrap();
    for g in 0..3 {
        assert_eq!(a.outline(g).unwrap(), b.outline(g).unwrap());
    }
}

#[test]
fn test_format12_cmap_reaches_astral_plane() {
    let data = basic_font()
        .map_char('\u{1F600}', 1)
        .cmap_format(CmapFormat::Auto)
        .build();
    let font = Font::new(&data).unwrap();
    assert_eq!(font.cmap().format(), 12);
    assert_eq!(font.glyph_index('\u{1F600}').unwrap(), Some(1));
    assert_eq!(font.glyph_index('A').unwrap(), Some(1));
    assert_eq!(font.glyph_index('B').unwrap(), None);
}

#[test]
fn test_missing_required_tables() {
    for tag in [
        Tag::HEAD,
        Tag::MAXP,
        Tag::HHEA,
        Tag::HMTX,
        Tag::GLYF,
        Tag::LOCA,
        Tag::CMAP,
    ] {
        let data = basic_font().omit_table(tag).build();
        assert_eq!(Font::new(&data).unwrap_err(), TtError::MissingTable(tag));
    }
}

#[test]
fn test_cff_flavoured_font_lacks_glyf() {
    let data = basic_font()
        .sfnt_version(OPENTYPE_CFF_MAGIC)
        .omit_table(Tag::GLYF)
        .omit_table(Tag::LOCA)
        .build();
    assert_eq!(Font::new(&data).unwrap_err(), TtError::MissingTable(Tag::GLYF));
}

#[test]
fn test_not_a_font() {
    let err = Font::new(b"definitely not a font").unwrap_err();
    assert!(matches!(err, TtError::InvalidFont(_)));
    assert!(matches!(
        Font::new(&[0, 1]),
        Err(TtError::OutOfBounds { .. })
    ));
}

#[test]
fn test_composite_chain_within_limit() {
    let data = composite_chain(5).build();
    let font = Font::new(&data).unwrap();
    let outline = font.outline(5).unwrap();
    // Five offsets of 10 units each
    assert_eq!(outline.bounds().unwrap().x_min, 50.0);
}

#[test]
fn test_composite_chain_beyond_limit() {
    let data = composite_chain(10).build();
    let font = Font::with_options(
        &data,
        FontOptions {
            outline: OutlineConfig::default().with_max_composite_depth(5),
            ..FontOptions::default()
        },
    )
    .unwrap();

    assert_eq!(
        font.outline(10),
        Err(TtError::CompositeRecursionLimit { glyph: 10, limit: 5 })
    );
    // Shallower composites in the same font still resolve
    assert!(font.outline(4).is_ok());
}

#[test]
fn test_self_referencing_composite() {
    let data = FontBuilder::new(1000)
        .glyph(GlyphSpec::composite(vec![ComponentSpec::offset(0, 0, 0)], 100))
        .build();
    let font = Font::new(&data).unwrap();
    assert!(matches!(
        font.outline(0),
        Err(TtError::CompositeRecursionLimit { glyph: 0, .. })
    ));
}

#[test]
fn test_composite_two_by_two_and_metrics() {
    let data = FontBuilder::new(1000)
        .glyph(GlyphSpec::simple(vec![square(0.0, 0.0, 100.0)], 321))
        .glyph(GlyphSpec::composite(
            vec![ComponentSpec::offset(0, 0, 0)
                .with_transform(ComponentTransform::TwoByTwo([0.0, 1.0, -1.0, 0.0]))
                .use_my_metrics()],
            999,
        ))
        .build();
    let font = Font::new(&data).unwrap();

    // Quarter turn: (x, y) -> (-y, x)
    let b = font.outline(1).unwrap().bounds().unwrap();
    assert_eq!((b.x_min, b.x_max, b.y_min, b.y_max), (-100.0, 0.0, 0.0, 100.0));
    assert_eq!(font.glyph_metrics(1).unwrap().advance_width, 321);
}

#[test]
fn test_anchored_component() {
    let data = FontBuilder::new(1000)
        .glyph(GlyphSpec::simple(vec![square(0.0, 0.0, 100.0)], 100))
        .glyph(GlyphSpec::composite(
            vec![
                ComponentSpec::offset(0, 0, 0),
                // Child point 0 onto parent point 2, the top right corner
                ComponentSpec::anchored(0, 2, 0),
            ],
            200,
        ))
        .build();
    let font = Font::new(&data).unwrap();
    let outline = font.outline(1).unwrap();
    assert_eq!(outline.contours()[1].points()[0], Point::on(100.0, 100.0));
}

#[test]
fn test_broken_glyph_does_not_poison_font() {
    // One contour ending at point 2, then a flag repeat past the end
    let mut raw = vec![0, 1, 0, 0, 0, 0, 0, 0, 0, 0];
    raw.extend_from_slice(&[0, 2, 0, 0, 0x09, 10]);
    let data = basic_font()
        .glyph(GlyphSpec::Raw {
            data: raw,
            advance: 100,
        })
        .build();
    let font = Font::new(&data).unwrap();

    let err = font.outline(3).unwrap_err();
    assert!(matches!(err, TtError::InvalidGlyphData { glyph: 3, .. }));
    assert!(err.is_glyph_recoverable());
    assert!(font.outline(1).is_ok());
}

#[test]
fn test_quadratic_contours_survive_round_trip() {
    let contour = vec![
        Point::on(0.0, 0.0),
        Point::off(0.0, 200.0),
        Point::off(200.0, 200.0),
        Point::on(200.0, 0.0),
    ];
    let data = FontBuilder::new(1000)
        .glyph(GlyphSpec::simple(vec![contour], 200))
        .build();
    let font = Font::new(&data).unwrap();
    let outline = font.outline(0).unwrap();
    let kinds: Vec<bool> = outline.contours()[0]
        .segments()
        .map(|s| matches!(s, Segment::Quad(..)))
        .collect();
    assert_eq!(kinds, vec![true, true, false]);
}

#[test]
fn test_kerning() {
    let data = basic_font().kern_pair(1, 1, -40).kern_pair(1, 2, 15).build();
    let font = Font::new(&data).unwrap();
    assert_eq!(font.kern_advance(1, 1).unwrap(), -40);
    assert_eq!(font.kern_advance(1, 2).unwrap(), 15);
    assert_eq!(font.kern_advance(2, 1).unwrap(), 0);

    let plain = basic_font().build();
    assert_eq!(Font::new(&plain).unwrap().kern_advance(1, 1).unwrap(), 0);
}

#[test]
fn test_collection() {
    let data = builder::collection(&[
        basic_font(),
        FontBuilder::new(2048).glyph(GlyphSpec::Empty { advance: 1 }),
    ]);
    assert_eq!(ttrast_sfnt::collection::font_count(&data).unwrap(), 2);

    let first = Font::from_collection(&data, 0).unwrap();
    let second = Font::from_collection(&data, 1).unwrap();
    assert_eq!(first.units_per_em(), 1000);
    assert_eq!(second.units_per_em(), 2048);
    assert_eq!(second.num_glyphs(), 1);
    assert!(Font::from_collection(&data, 2).is_err());
}

#[test]
fn test_font_is_shareable_across_threads() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Font<'static>>();

    let data = basic_font().build();
    let font = Font::new(&data).unwrap();
    std::thread::scope(|s| {
        for _ in 0..4 {
            s.spawn(|| {
                assert_eq!(font.outline(1).unwrap().point_count(), 4);
            });
        }
    });
}

#[test]
fn test_outline_decoding_respects_host_budget() {
    // A 2000-point zigzag contour
    let points: Vec<Point> = (0..2000)
        .map(|i| Point::on(i as f32, if i % 2 == 0 { 0.0 } else { 100.0 }))
        .collect();
    let data = FontBuilder::new(1000)
        .glyph(GlyphSpec::Empty { advance: 500 })
        .glyph(GlyphSpec::simple(vec![points], 2000))
        .build();

    let open = |budget: &Arc<BudgetAllocator>| {
        let options = FontOptions {
            host: Host::with_allocator(budget.clone()),
            ..FontOptions::default()
        };
        Font::with_options(&data, options).unwrap()
    };

    let empty = Arc::new(BudgetAllocator::new(0));
    let err = open(&empty).outline(1).unwrap_err();
    assert!(matches!(err, TtError::AllocationFailed { .. }));
    assert_eq!(empty.in_use(), 0);

    let ample = Arc::new(BudgetAllocator::new(1 << 20));
    let outline = open(&ample).outline(1).unwrap();
    assert_eq!(outline.contours()[0].len(), 2000);
    assert_eq!(ample.in_use(), 0);
}
