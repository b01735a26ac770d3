use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec::Vec;
use alloc::{format, vec};
use std::io::Cursor;

use crate::data::{Advance, ArchiveReader, ArchiveWriter, Data, DataKind};
use crate::fingerprint::Fingerprint;
use crate::info::{Field, Typed};
use crate::persist::{self, Archive, ArchiveConfig, ArchiveError, ArchiveFlags, ArchiveState};
use crate::persist::{ArchiveStatus, ArchiveWarning, Outcome, ParseError, StreamError};
use crate::registry::TypeRegistry;
use crate::{Object, UnknownValue, impl_reflect_object, impl_reflect_struct};

// -----------------------------------------------------------------------------
// Fixtures

#[derive(Default)]
struct Point {
    x: f32,
    y: f32,
}

impl_reflect_struct!(Point, "Point", [x, y]);

#[derive(Default)]
struct Material {
    roughness: f32,
    tint: String,
}

impl_reflect_object!(Material, "Material", [roughness, tint]);
impl Object for Material {}

#[derive(Default)]
struct Mesh {
    name: String,
    count: u32,
    points: Vec<Point>,
    weights: Vec<f64>,
    material: Option<Box<dyn Object>>,
    parts: Vec<Box<dyn Object>>,
    slots: Vec<Option<Box<dyn Object>>>,
}

impl_reflect_object!(Mesh, "Mesh", [name, count, points, weights, material, parts, slots]);
impl Object for Mesh {}

/// Written as its text, without field children.
#[derive(Default)]
struct Label {
    text: String,
}

impl_reflect_object!(Label, "Label", []);

impl Object for Label {
    fn is_compact(&self) -> bool {
        true
    }

    fn as_data(&self) -> Option<&dyn Data> {
        Some(&self.text)
    }

    fn as_data_mut(&mut self) -> Option<&mut dyn Data> {
        Some(&mut self.text)
    }
}

#[derive(Default)]
struct Journal {
    entries: u32,
    claimed: Vec<(Fingerprint, String)>,
}

impl_reflect_object!(Journal, "Journal", [entries]);

impl Object for Journal {
    fn process_unknown(&mut self, value: UnknownValue, field: Fingerprint) -> bool {
        match value {
            UnknownValue::Text { text, .. } => {
                self.claimed.push((field, text));
                true
            }
            _ => false,
        }
    }
}

#[derive(Default)]
struct Tracked {
    shown: u8,
    hidden: u8,
    events: Vec<String>,
}

impl_reflect_object!(Tracked, "Tracked", [shown, hidden]);

impl Object for Tracked {
    fn should_serialize(&self, field: &Field) -> bool {
        field.name() != "hidden"
    }

    fn pre_deserialize(&mut self, field: Option<&Field>) {
        self.events.push(format!("pre {}", field.map_or("*", Field::name)));
    }

    fn post_deserialize(&mut self, field: Option<&Field>) {
        self.events.push(format!("post {}", field.map_or("*", Field::name)));
    }
}

/// Records what the reader tells a codec.
#[derive(Default)]
struct Stamp {
    seen: Option<(u32, &'static str, &'static str)>,
}

impl Data for Stamp {
    fn data_class(&self) -> &'static str {
        Self::DATA_CLASS
    }

    fn serialize(&self, writer: &mut dyn ArchiveWriter) -> Result<(), ArchiveError> {
        writer.write_text("stamp")
    }

    fn deserialize(&mut self, reader: &mut dyn ArchiveReader) -> Result<Advance, ArchiveError> {
        let frame = reader.field_context().ok_or(ArchiveError::UnexpectedEnd)?;
        let field = frame.field().map_or("", Field::name);
        self.seen = Some((reader.version(), frame.owner().name(), field));
        Ok(Advance::Pending)
    }
}

impl DataKind for Stamp {
    const DATA_CLASS: &'static str = "Stamp";
}

#[derive(Default)]
struct Ledger {
    stamp: Stamp,
}

impl_reflect_object!(Ledger, "Ledger", [stamp]);
impl Object for Ledger {}

fn registry() -> TypeRegistry {
    let mut registry = TypeRegistry::new();
    registry.register::<Mesh>();
    registry.register::<Material>();
    registry.register::<Label>();
    registry.register::<Journal>();
    registry.register::<Tracked>();
    registry.register::<Ledger>();
    registry
}

fn material(roughness: f32, tint: &str) -> Box<dyn Object> {
    Box::new(Material {
        roughness,
        tint: tint.into(),
    })
}

fn archive_text(body: &str) -> String {
    format!("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<Reflect FileFormatVersion=\"4\">\n{body}</Reflect>\n")
}

fn write(objects: Vec<Box<dyn Object>>) -> String {
    let mut archive = Archive::writer(Vec::new());
    archive.set_objects(objects);
    assert_eq!(archive.write().unwrap(), Outcome::Complete);
    String::from_utf8(archive.into_inner()).unwrap()
}

fn read(text: &str, registry: &TypeRegistry) -> (Vec<Box<dyn Object>>, Vec<ArchiveWarning>) {
    let mut archive = Archive::reader(Cursor::new(text.as_bytes()), registry);
    assert_eq!(archive.read().unwrap(), Outcome::Complete);
    (archive.take_objects(), archive.warnings().to_vec())
}

fn read_err(text: &str, registry: &TypeRegistry) -> ArchiveError {
    let mut archive = Archive::reader(Cursor::new(text.as_bytes()), registry);
    archive.read().unwrap_err()
}

// -----------------------------------------------------------------------------
// Writing

#[test]
fn written_markup() {
    let text = write(vec![material(0.5, "red")]);
    assert_eq!(
        text,
        archive_text(
            "  <Object Type=\"Material\">\n\
            \x20   <Object Type=\"f32\" Name=\"roughness\"><![CDATA[0.5]]></Object>\n\
            \x20   <Object Type=\"String\" Name=\"tint\"><![CDATA[red]]></Object>\n\
            \x20 </Object>\n"
        )
    );
}

#[test]
fn write_progress_events() {
    let mut events = Vec::new();
    {
        let mut archive = Archive::writer(Vec::new());
        archive.set_objects((0..4).map(|_| material(1.0, "")).collect());
        archive.set_observer(|status: &mut ArchiveStatus| events.push((status.state, status.progress)));
        assert_eq!(archive.write().unwrap(), Outcome::Complete);
    }

    use ArchiveState::*;
    assert_eq!(
        events,
        [
            (Starting, 0),
            (ObjectProcessed, 0),
            (ObjectProcessed, 25),
            (ObjectProcessed, 50),
            (ObjectProcessed, 75),
            (ObjectProcessed, 100),
            (Complete, 100),
        ]
    );
}

#[test]
fn status_flag_off() {
    let mut events = Vec::new();
    {
        let config = ArchiveConfig {
            flags: ArchiveFlags::empty(),
            ..ArchiveConfig::default()
        };
        let mut archive = Archive::writer(Vec::new()).with_config(config);
        archive.set_objects(vec![material(1.0, "")]);
        archive.set_observer(|status: &mut ArchiveStatus| events.push(status.state));
        assert_eq!(archive.write().unwrap(), Outcome::Complete);
    }
    assert_eq!(events, [ArchiveState::Starting, ArchiveState::Complete]);
}

#[test]
fn cancelled_write_is_unterminated() {
    let mut archive = Archive::writer(Vec::new());
    archive.set_objects(vec![material(1.0, "a"), material(2.0, "b"), material(3.0, "c")]);
    archive.set_observer(|status: &mut ArchiveStatus| {
        if status.state == ArchiveState::ObjectProcessed {
            status.abort = true;
        }
    });
    assert_eq!(archive.write().unwrap(), Outcome::Cancelled);
    assert_eq!(archive.objects().len(), 3);

    let text = String::from_utf8(archive.into_inner()).unwrap();
    assert_eq!(text.matches("Type=\"Material\"").count(), 1);
    assert!(!text.contains("</Reflect>"));
}

#[test]
fn skipped_fields_and_hooks() {
    let text = write(vec![Box::new(Tracked {
        shown: 1,
        hidden: 2,
        events: Vec::new(),
    })]);
    assert!(text.contains("Name=\"shown\""));
    assert!(!text.contains("Name=\"hidden\""));

    let (objects, warnings) = read(&text, &registry());
    assert!(warnings.is_empty());
    let tracked = objects[0].downcast_ref::<Tracked>().unwrap();
    assert_eq!((tracked.shown, tracked.hidden), (1, 0));
    assert_eq!(tracked.events, ["pre *", "pre shown", "post shown", "post *"]);
}

// -----------------------------------------------------------------------------
// Reading

#[test]
fn round_trip() {
    let mesh = Mesh {
        name: "cube <1> & \"more\" ]]>".into(),
        count: 8,
        points: vec![Point { x: 1.5, y: -2.0 }, Point { x: 0.0, y: 0.25 }],
        weights: vec![0.125, 3.0],
        material: Some(material(0.75, "blue")),
        parts: vec![
            material(0.5, "left"),
            Box::new(Label {
                text: "  padded ".into(),
            }),
        ],
        slots: vec![Some(material(1.0, "slot")), None],
    };
    let text = write(vec![Box::new(mesh)]);

    let (objects, warnings) = read(&text, &registry());
    assert!(warnings.is_empty(), "{warnings:?}");
    assert_eq!(objects.len(), 1);

    let mesh = objects[0].downcast_ref::<Mesh>().unwrap();
    assert_eq!(mesh.name, "cube <1> & \"more\" ]]>");
    assert_eq!(mesh.count, 8);
    let points: Vec<_> = mesh.points.iter().map(|p| (p.x, p.y)).collect();
    assert_eq!(points, [(1.5, -2.0), (0.0, 0.25)]);
    assert_eq!(mesh.weights, [0.125, 3.0]);

    let material = mesh.material.as_deref().unwrap().downcast_ref::<Material>().unwrap();
    assert_eq!((material.roughness, material.tint.as_str()), (0.75, "blue"));

    assert_eq!(mesh.parts.len(), 2);
    assert_eq!(mesh.parts[0].downcast_ref::<Material>().unwrap().tint, "left");
    assert_eq!(mesh.parts[1].downcast_ref::<Label>().unwrap().text, "  padded ");

    assert_eq!(mesh.slots.len(), 2);
    assert!(mesh.slots[0].as_deref().is_some_and(|o| o.is::<Material>()));
    assert!(mesh.slots[1].is_none());
}

#[test]
fn null_reference() {
    let text = write(vec![Box::new(Mesh::default())]);
    assert!(text.contains("<Object Type=\"\"></Object>"));

    let (objects, _) = read(&text, &registry());
    let mesh = objects[0].downcast_ref::<Mesh>().unwrap();
    assert!(mesh.material.is_none());
}

#[test]
fn object_written_as_data() {
    let text = write(vec![Box::new(Label { text: "hi".into() })]);
    assert_eq!(text, archive_text("  <Object Type=\"Label\"><![CDATA[hi]]></Object>\n"));

    let (objects, _) = read(&text, &registry());
    assert_eq!(objects[0].downcast_ref::<Label>().unwrap().text, "hi");
}

#[test]
fn field_order_is_free() {
    let text = archive_text(
        "<Object Type=\"Material\">\
            <Object Type=\"String\" Name=\"tint\">green</Object>\
            <Object Type=\"f32\" Name=\"roughness\"> 0.25 </Object>\
        </Object>\n",
    );
    let (objects, warnings) = read(&text, &registry());
    assert!(warnings.is_empty());
    let material = objects[0].downcast_ref::<Material>().unwrap();
    assert_eq!((material.roughness, material.tint.as_str()), (0.25, "green"));
}

#[test]
fn unknown_field_is_dropped() {
    let text = archive_text(
        "<Object Type=\"Mesh\">\
            <Object Type=\"u8\" Name=\"legacy\">3</Object>\
            <Object Type=\"u32\" Name=\"count\">5</Object>\
        </Object>\n",
    );
    let (objects, warnings) = read(&text, &registry());
    assert_eq!(objects[0].downcast_ref::<Mesh>().unwrap().count, 5);
    assert_eq!(
        warnings,
        [ArchiveWarning::UnknownField {
            owner: "Mesh",
            field: "legacy".into(),
        }]
    );
}

#[test]
fn unknown_field_claimed() {
    let text = archive_text(
        "<Object Type=\"Journal\">\
            <Object Type=\"String\" Name=\"title\">old</Object>\
            <Object Type=\"u32\" Name=\"entries\">2</Object>\
        </Object>\n",
    );
    let (objects, warnings) = read(&text, &registry());
    assert!(warnings.is_empty());
    let journal = objects[0].downcast_ref::<Journal>().unwrap();
    assert_eq!(journal.entries, 2);
    assert_eq!(journal.claimed, [(Fingerprint::of("title"), String::from("old"))]);
}

#[test]
fn unreadable_unknown_field_is_discarded() {
    let text = archive_text(
        "<Object Type=\"Mesh\">\
            <Object Type=\"Material\" Name=\"spare\">\
                <Object Type=\"f32\" Name=\"roughness\">rough</Object>\
                <Object Type=\"String\" Name=\"tint\">lost</Object>\
            </Object>\
            <Object Type=\"u32\" Name=\"count\">9</Object>\
        </Object>\n",
    );
    let (objects, warnings) = read(&text, &registry());
    assert_eq!(objects[0].downcast_ref::<Mesh>().unwrap().count, 9);
    assert_eq!(warnings.len(), 1);
    assert!(matches!(
        &warnings[0],
        ArchiveWarning::DiscardedField { owner: "Mesh", field, .. } if field == "spare"
    ));
}

#[test]
fn unregistered_type_is_skipped() {
    let text = archive_text(
        "<Object Type=\"Ghost\"><Object Type=\"u8\" Name=\"x\">1</Object></Object>\
        <Object Type=\"Material\"><Object Type=\"String\" Name=\"tint\">kept</Object></Object>\n",
    );
    let (objects, warnings) = read(&text, &registry());
    assert_eq!(objects.len(), 1);
    assert_eq!(objects[0].downcast_ref::<Material>().unwrap().tint, "kept");
    assert_eq!(
        warnings,
        [ArchiveWarning::Unallocated {
            type_name: "Ghost".into(),
        }]
    );
}

#[test]
fn unregistered_root_between_readable_roots() {
    let text = archive_text(
        "<Object Type=\"Material\"><Object Type=\"String\" Name=\"tint\">first</Object></Object>\
        <Object Type=\"Ghost\">\
            <Object Type=\"Material\" Name=\"inner\"><Object Type=\"String\" Name=\"tint\">hidden</Object></Object>\
        </Object>\
        <Object Type=\"Material\"><Object Type=\"String\" Name=\"tint\">third</Object></Object>\n",
    );
    let (objects, warnings) = read(&text, &registry());
    let tints: Vec<_> = objects
        .iter()
        .map(|object| object.downcast_ref::<Material>().unwrap().tint.as_str())
        .collect();
    assert_eq!(tints, ["first", "third"]);
    assert_eq!(
        warnings,
        [ArchiveWarning::Unallocated {
            type_name: "Ghost".into(),
        }]
    );
}

#[test]
fn unknown_field_of_unregistered_type() {
    let text = archive_text(
        "<Object Type=\"Mesh\">\
            <Object Type=\"Ghost\" Name=\"legacy\"><Object Type=\"u8\" Name=\"x\">1</Object></Object>\
            <Object Type=\"u32\" Name=\"count\">4</Object>\
        </Object>\n",
    );
    let (objects, warnings) = read(&text, &registry());
    assert_eq!(objects[0].downcast_ref::<Mesh>().unwrap().count, 4);
    assert_eq!(
        warnings,
        [ArchiveWarning::Unallocated {
            type_name: "Ghost".into(),
        }]
    );
}

#[test]
fn struct_at_root_is_rejected() {
    let text = archive_text("<Object Type=\"Point\"><Object Type=\"f32\" Name=\"x\">1</Object></Object>\n");
    let (objects, warnings) = read(&text, &registry());
    assert!(objects.is_empty());
    assert_eq!(warnings, [ArchiveWarning::Rejected { type_name: "Point" }]);
}

#[test]
fn data_class_mismatch() {
    let text = archive_text(
        "<Object Type=\"Material\">\
            <Object Type=\"u8\" Name=\"roughness\">3</Object>\
            <Object Type=\"String\" Name=\"tint\">still read</Object>\
        </Object>\n",
    );
    let (objects, warnings) = read(&text, &registry());
    let material = objects[0].downcast_ref::<Material>().unwrap();
    assert_eq!((material.roughness, material.tint.as_str()), (0.0, "still read"));
    assert_eq!(
        warnings,
        [ArchiveWarning::DataClassMismatch {
            owner: "Material",
            field: "roughness",
            expected: "f32",
            found: "u8",
        }]
    );
}

#[test]
fn unregistered_field_type_fails() {
    let text = archive_text(
        "<Object Type=\"Material\"><Object Type=\"Mystery\" Name=\"roughness\">1</Object></Object>\n",
    );
    let error = read_err(&text, &registry());
    assert!(matches!(
        error,
        ArchiveError::TypeInformation { owner: "Material", field: "roughness", ref data_class }
            if data_class == "Mystery"
    ));
}

#[test]
fn unreadable_value_fails() {
    let text = archive_text("<Object Type=\"Mesh\"><Object Type=\"u32\" Name=\"count\">many</Object></Object>\n");
    let error = read_err(&text, &registry());
    assert!(matches!(error, ArchiveError::Data { data_class: "u32", .. }));
}

#[test]
fn malformed_markup_fails() {
    let error = read_err("<Reflect><Object Type=\"Material\"></Reflect>", &registry());
    assert!(matches!(error, ArchiveError::Parse(ParseError { .. })));
}

#[test]
fn empty_stream_fails() {
    let error = read_err("", &registry());
    assert!(matches!(error, ArchiveError::Stream(StreamError::Empty)));
}

#[test]
fn missing_registry() {
    let mut archive = Archive::writer(Cursor::new(Vec::new()));
    assert!(matches!(archive.read(), Err(ArchiveError::MissingRegistry)));
}

#[test]
fn file_format_version() {
    let registry = registry();
    let ledger = "<Object Type=\"Ledger\"><Object Type=\"Stamp\" Name=\"stamp\">x</Object></Object>";

    let text = format!("<Reflect FileFormatVersion=\"3\">{ledger}</Reflect>");
    let mut archive = Archive::reader(Cursor::new(text.as_bytes()), &registry);
    assert_eq!(archive.read().unwrap(), Outcome::Complete);
    assert_eq!(archive.version(), 3);
    let stamp = &archive.objects()[0].downcast_ref::<Ledger>().unwrap().stamp;
    assert_eq!(stamp.seen, Some((3, "Ledger", "stamp")));

    let text = format!("<Reflect>{ledger}</Reflect>");
    let mut archive = Archive::reader(Cursor::new(text.as_bytes()), &registry);
    assert_eq!(archive.read().unwrap(), Outcome::Complete);
    assert_eq!(archive.version(), persist::CURRENT_VERSION);
}

#[test]
fn header_only() {
    let registry = registry();
    let text = "<Reflect FileFormatVersion=\" 2 \"><Object Type=\"Nowhere\"/></Reflect>";
    let mut archive = Archive::reader(Cursor::new(text.as_bytes()), &registry);
    assert_eq!(archive.read_file_header(false).unwrap(), 2);
    assert!(archive.objects().is_empty());
    assert!(archive.warnings().is_empty());

    archive.set_version(7);
    assert_eq!(archive.read_file_header(true).unwrap(), 2);
    assert_eq!(archive.document().map(|d| d.len()), Some(2));
}

#[test]
fn leading_byte_order_mark() {
    let text = format!("\u{FEFF}{}", write(vec![material(0.75, "marked")]));
    let (objects, warnings) = read(&text, &registry());
    assert!(warnings.is_empty());
    assert_eq!(objects[0].downcast_ref::<Material>().unwrap().tint, "marked");
}

#[test]
fn large_text_reads_in_linear_time() {
    fn round_trip(len: usize) -> std::time::Duration {
        let tint: String = "abcdefgh".repeat(len / 8);
        let text = write(vec![material(0.0, &tint)]);

        let start = std::time::Instant::now();
        let (objects, _) = read(&text, &registry());
        let elapsed = start.elapsed();
        assert_eq!(objects[0].downcast_ref::<Material>().unwrap().tint.len(), tint.len());
        elapsed
    }

    let one = round_trip(1 << 20);
    let four = round_trip(4 << 20);
    // Linear reading takes about four times as long, quadratic sixteen.
    assert!(
        four <= one * 8 + std::time::Duration::from_millis(100),
        "1 MiB: {one:?}, 4 MiB: {four:?}"
    );
}

#[test]
fn small_chunks() {
    let text = write(vec![
        material(0.5, "a <long> tint with ]]> inside"),
        Box::new(Label { text: "x".into() }),
    ]);
    let registry = registry();
    let config = ArchiveConfig {
        chunk_size: 3,
        ..ArchiveConfig::default()
    };
    let mut archive = Archive::reader(Cursor::new(text.as_bytes()), &registry).with_config(config);
    assert_eq!(archive.read().unwrap(), Outcome::Complete);
    assert_eq!(archive.size(), text.len() as u64);
    assert_eq!(archive.parse_progress(), 100);
    assert_eq!(
        archive.objects()[0].downcast_ref::<Material>().unwrap().tint,
        "a <long> tint with ]]> inside"
    );
}

#[test]
fn read_progress_and_cancel() {
    let text = write((0..3).map(|_| material(1.0, "")).collect());
    let registry = registry();

    let mut events = Vec::new();
    {
        let mut archive = Archive::reader(Cursor::new(text.as_bytes()), &registry);
        archive.set_observer(|status: &mut ArchiveStatus| events.push(status.progress));
        assert_eq!(archive.read().unwrap(), Outcome::Complete);
    }
    assert_eq!(events, [0, 0, 33, 66, 100, 100]);

    let mut archive = Archive::reader(Cursor::new(text.as_bytes()), &registry);
    archive.set_observer(|status: &mut ArchiveStatus| {
        if status.state == ArchiveState::ObjectProcessed {
            status.abort = true;
        }
    });
    assert_eq!(archive.read().unwrap(), Outcome::Cancelled);
    assert_eq!(archive.objects().len(), 1);
}

#[test]
fn search_class_is_noted() {
    let text = write(vec![Box::new(Label { text: "a".into() }), material(1.0, "")]);
    let registry = registry();

    let mut archive = Archive::reader(Cursor::new(text.as_bytes()), &registry);
    archive.set_search_class(Some(Material::static_class()));
    assert_eq!(archive.read().unwrap(), Outcome::Complete);
    assert!(archive.found_search_class());

    let mut archive = Archive::reader(Cursor::new(text.as_bytes()), &registry);
    archive.set_search_class(Some(Mesh::static_class()));
    assert_eq!(archive.read().unwrap(), Outcome::Complete);
    assert!(!archive.found_search_class());
}

#[test]
fn pull_reading() {
    let text = archive_text(
        "<Object Type=\"Material\"></Object>\
        <Object Type=\"Ghost\"></Object>\
        <Object Type=\"Label\">last</Object>\n",
    );
    let registry = registry();
    let mut archive = Archive::reader(Cursor::new(text.as_bytes()), &registry);
    assert!(archive.begin_reading_single_objects().unwrap());

    let (first, more) = archive.read_single_object().unwrap();
    assert!(first.is_some_and(|o| o.is::<Material>()) && more);
    let (second, more) = archive.read_single_object().unwrap();
    assert!(second.is_none() && more);
    let (third, more) = archive.read_single_object().unwrap();
    assert_eq!(third.unwrap().downcast::<Label>().unwrap().text, "last");
    assert!(!more);
    assert!(matches!(archive.read_single_object(), Ok((None, false))));

    let text = archive_text("");
    let mut archive = Archive::reader(Cursor::new(text.as_bytes()), &registry);
    assert!(!archive.begin_reading_single_objects().unwrap());
}

// -----------------------------------------------------------------------------
// Convenience functions

#[test]
fn string_conversions() {
    let registry = registry();
    let text = persist::objects_to_string(&[
        Box::new(Label { text: "first".into() }) as Box<dyn Object>,
        material(0.5, "second"),
    ])
    .unwrap();

    let first = persist::from_str(&text, &registry, None).unwrap().unwrap();
    assert!(first.is::<Label>());

    let found = persist::from_str(&text, &registry, Some(Material::static_class())).unwrap();
    assert!(found.is_some_and(|o| o.is::<Material>()));
    assert!(persist::from_str(&text, &registry, Some(Mesh::static_class())).unwrap().is_none());

    let material = persist::from_str_as::<Material>(&text, &registry).unwrap().unwrap();
    assert_eq!(material.tint, "second");

    assert!(text.ends_with("</Reflect>\n"));
    let objects = persist::objects_from_str(&text, &registry).unwrap();
    assert_eq!(objects.len(), 2);

    let single = persist::to_string(&*objects[1]).unwrap();
    assert_eq!(single.matches("Type=\"Material\"").count(), 1);
    assert!(single.ends_with("</Reflect>\n"));
}

#[test]
fn file_round_trip() {
    let path = std::env::temp_dir().join(format!("vc_reflect_archive_{}.xml", std::process::id()));
    let registry = registry();

    let mut archive = Archive::create(&path).unwrap();
    archive.set_objects(vec![material(0.5, "on disk")]);
    assert_eq!(archive.write().unwrap(), Outcome::Complete);
    drop(archive);

    let mut archive = Archive::open(&path, &registry).unwrap();
    assert_eq!(archive.read().unwrap(), Outcome::Complete);
    assert_eq!(archive.objects()[0].downcast_ref::<Material>().unwrap().tint, "on disk");

    std::fs::remove_file(&path).unwrap();
}
