use smallvec::smallvec;

use crate::{
    Config, Element, Error, Format, Ply, ReadOptions, Reader,
    raw::{ListLenType, Property, PropertyDef, PropertyType, Row, ScalarType},
};


// ===========================================================================
// ===== Helpers
// ===========================================================================

fn row(values: Vec<Property>) -> Row {
    values.into()
}

/// The document stored in `test_files/cube_*.ply`.
fn cube(format: Format) -> Ply {
    let positions = [
        [-0.5, -0.5, -0.5],
        [1.5, -0.5, -0.5],
        [1.5, 1.5, -0.5],
        [-0.5, 1.5, -0.5],
        [-0.5, -0.5, 1.5],
        [1.5, -0.5, 1.5],
        [1.5, 1.5, 1.5],
        [-0.5, 1.5, 1.5f32],
    ];
    let faces = [
        [0u32, 3, 2, 1],
        [4, 5, 6, 7],
        [0, 1, 5, 4],
        [1, 2, 6, 5],
        [2, 3, 7, 6],
        [3, 0, 4, 7],
    ];

    let mut vertex = Element::new("vertex", 8);
    for name in &["x", "y", "z"] {
        vertex.add_property(PropertyDef::scalar(*name, ScalarType::Float));
    }
    for name in &["red", "green", "blue"] {
        vertex.add_property(PropertyDef::scalar(*name, ScalarType::UChar));
    }
    for (i, [x, y, z]) in positions.iter().enumerate() {
        let i = i as u8;
        vertex.push_row(row(vec![
            (*x).into(),
            (*y).into(),
            (*z).into(),
            (i * 32).into(),
            (255 - i * 32).into(),
            (7 * i).into(),
        ]));
    }

    let mut face = Element::new("face", 6);
    face.add_property(PropertyDef::list("vertex_indices", ListLenType::UChar, ScalarType::UInt));
    for f in &faces {
        face.push_row(row(vec![Property::from(&f[..])]));
    }

    let mut ply = Ply::new();
    ply.set_format(format);
    ply.add_comment("a cube with colored vertices");
    ply.add_comment("second comment");
    ply.obj_infos.push("generated for tests".into());
    ply.add_element(vertex);
    ply.add_element(face);
    ply
}

fn ascii(header_and_body: &str) -> Result<Ply, Error> {
    Ply::read(header_and_body.as_bytes())
}

fn assert_format_error(res: Result<Ply, Error>, needle: &str) {
    match res {
        Err(Error::Format(msg)) => {
            assert!(msg.contains(needle), "error {:?} doesn't contain {:?}", msg, needle);
        }
        other => panic!("expected format error containing {:?}, got {:?}", needle, other),
    }
}

fn assert_data_error(res: Result<Ply, Error>, needle: &str) {
    match res {
        Err(Error::Data(msg)) => {
            assert!(msg.contains(needle), "error {:?} doesn't contain {:?}", msg, needle);
        }
        other => panic!("expected data error containing {:?}, got {:?}", needle, other),
    }
}

fn non_native_binary() -> Format {
    match Format::binary_native() {
        Format::BinaryLittleEndian => Format::BinaryBigEndian,
        _ => Format::BinaryLittleEndian,
    }
}


// ===========================================================================
// ===== Reading
// ===========================================================================

#[test]
fn read_vertex_with_index_list() -> Result<(), Error> {
    let ply = Ply::read(include_test_file!("vertex_with_index_list.ply"))?;

    assert_eq!(ply.format, Some(Format::Ascii));
    assert_eq!(ply.elements.len(), 1);

    let vertex = &ply.elements[0];
    assert_eq!(vertex.name(), "vertex");
    assert_eq!(vertex.def.count, 2);
    assert_eq!(*vertex.def.property_defs, vec![
        PropertyDef::scalar("x", ScalarType::Float),
        PropertyDef::scalar("y", ScalarType::Float),
        PropertyDef::list("idx", ListLenType::UChar, ScalarType::Int),
    ]);

    assert_eq!(vertex.rows, vec![
        row(vec![1.0f32.into(), 2.0f32.into(), vec![10i32, 20].into()]),
        row(vec![3.0f32.into(), 4.0f32.into(), vec![30i32].into()]),
    ]);
    assert_eq!(vertex.get(1, "idx"), Some(&Property::IntList(smallvec![30])));
    assert_eq!(vertex.get(2, "idx"), None);
    assert_eq!(vertex.get(0, "z"), None);

    Ok(())
}

#[test]
fn read_all_types() -> Result<(), Error> {
    let ply = Ply::read(include_test_file!("all_types_ascii.ply"))?;
    assert_eq!(ply.comments, vec!["every type, once with sized names"]);

    let values = &ply.elements[0];
    let types = values.def.property_defs.iter().map(|p| p.ty).collect::<Vec<_>>();
    let expected_types = ScalarType::ALL.iter()
        .map(|&ty| PropertyType::Scalar(ty))
        .collect::<Vec<_>>();
    assert_eq!(types, expected_types);

    assert_eq!(values.rows[0], row(vec![
        Property::Char(i8::min_value()),
        Property::UChar(u8::max_value()),
        Property::Short(i16::min_value()),
        Property::UShort(u16::max_value()),
        Property::Int(i32::min_value()),
        Property::UInt(u32::max_value()),
        Property::Long(i64::min_value()),
        Property::ULong(u64::max_value()),
        Property::Float(3.5),
        Property::Double(-0.125),
    ]));
    assert_eq!(values.rows[1][crate::raw::PropIndex(8)], Property::Float(0.1));
    assert_eq!(values.rows[1][crate::raw::PropIndex(9)], Property::Double(1e300));

    let lists = &ply.elements[1];
    assert_eq!(lists.def.property_defs[crate::raw::PropIndex(3)].ty, PropertyType::List {
        len_type: ListLenType::ULong,
        scalar_type: ScalarType::Double,
    });
    assert_eq!(lists.rows, vec![
        row(vec![
            Property::CharList(smallvec![-1, 1]),
            Property::ShortList(smallvec![10, 20, 30]),
            Property::UIntList(smallvec![42]),
            Property::DoubleList(smallvec![]),
        ]),
        row(vec![
            Property::CharList(smallvec![]),
            Property::ShortList(smallvec![]),
            Property::UIntList(smallvec![]),
            Property::DoubleList(smallvec![2.5]),
        ]),
    ]);

    Ok(())
}

#[test]
fn all_types_survive_every_format() -> Result<(), Error> {
    let original = Ply::read(include_test_file!("all_types_ascii.ply"))?;

    for &format in &[Format::Ascii, Format::BinaryLittleEndian, Format::BinaryBigEndian] {
        let mut ply = original.clone();
        ply.set_format(format);

        let written = ply.write_to_memory()?;
        let read = Ply::read(&*written)?;
        assert_eq!(read, ply, "mismatch for {}", format);
    }

    Ok(())
}

#[test]
fn written_headers_use_classic_type_names() -> Result<(), Error> {
    let ply = Ply::read(include_test_file!("all_types_ascii.ply"))?;
    let written = String::from_utf8(ply.write_to_memory()?).unwrap();

    assert!(written.contains("\
        element values 2\n\
        property char a\n\
        property uchar b\n\
        property short c\n\
        property ushort d\n\
        property int e\n\
        property uint f\n\
        property long g\n\
        property ulong h\n\
        property float i\n\
        property double j\n\
        element lists 2\n\
        property list uchar char la\n\
        property list ushort short lb\n\
        property list uint uint lc\n\
        property list ulong double ld\n\
        end_header\n\
    "));

    Ok(())
}

macro_rules! cube_tests {
    ($name:ident, $format:ident, $file:literal) => {
        paste::item! {
            #[test]
            fn [<read_cube_ $name>]() -> Result<(), Error> {
                let ply = Ply::read(include_test_file!($file))?;
                assert_eq!(ply, cube(Format::$format));
                Ok(())
            }

            #[test]
            fn [<write_cube_ $name>]() -> Result<(), Error> {
                let out = cube(Format::$format).write_to_memory()?;
                assert_eq_file!(&*out, $file);
                Ok(())
            }
        }
    };
}

cube_tests!(ascii, Ascii, "cube_ascii.ply");
cube_tests!(ble, BinaryLittleEndian, "cube_ble.ply");
cube_tests!(bbe, BinaryBigEndian, "cube_bbe.ply");

#[test]
fn header_only() -> Result<(), Error> {
    let reader = Reader::new(include_test_file!("cube_bbe.ply"))?;

    assert_eq!(reader.format(), Format::BinaryBigEndian);
    assert_eq!(reader.comments(), &["a cube with colored vertices", "second comment"]);
    assert_eq!(reader.obj_infos(), &["generated for tests"]);

    let names = reader.elements().iter().map(|e| e.name.as_str()).collect::<Vec<_>>();
    assert_eq!(names, ["vertex", "face"]);
    assert_eq!(reader.elements()[1].count, 6);
    assert_eq!(reader.elements()[0].prop_pos("blue"), Some(crate::raw::PropIndex(5)));

    let ply = reader.read_body()?;
    assert_eq!(ply, cube(Format::BinaryBigEndian));

    Ok(())
}

#[test]
fn parse_and_serialize() -> Result<(), Error> {
    let ply = crate::parse(include_test_file!("cube_ascii.ply"))?;

    let mut out = Vec::new();
    crate::serialize(&ply, &mut out)?;
    assert_eq_file!(&*out, "cube_ascii.ply");

    Ok(())
}

#[test]
fn header_with_crlf_and_binary_body_starting_with_linebreak() -> Result<(), Error> {
    let mut data = b"ply\r\n\
        format binary_little_endian 1.0\r\n\
        element v 3\r\n\
        property uchar a\r\n\
        end_header\r\n"
        .to_vec();
    data.extend_from_slice(&[0x0A, 0x0D, 0x0A]);

    let ply = Ply::read(&*data)?;
    assert_eq!(ply.elements[0].rows, vec![
        row(vec![Property::UChar(0x0A)]),
        row(vec![Property::UChar(0x0D)]),
        row(vec![Property::UChar(0x0A)]),
    ]);

    Ok(())
}

#[test]
fn header_with_cr_only_and_empty_lines() -> Result<(), Error> {
    let ply = ascii(
        "ply\r\rformat ascii 1.0\r\relement v 1\rproperty   short a\r\rend_header\r-3\r"
    )?;
    assert_eq!(ply.elements[0].rows, vec![row(vec![Property::Short(-3)])]);

    Ok(())
}

#[test]
fn comments_and_obj_info() -> Result<(), Error> {
    let ply = ascii("\
        ply\n\
        format ascii 1.0\n\
        comment   indented text\n\
        obj_info num_cols 3\n\
        element v 0\n\
        comment\n\
        property int a\n\
        end_header\n\
    ")?;

    assert_eq!(ply.comments, vec!["  indented text", ""]);
    assert_eq!(ply.obj_infos, vec!["num_cols 3"]);
    assert_eq!(ply.elements[0].def.property_defs.len(), 1);

    // Comments are written after the format line, obj_info lines after the
    // comments.
    let written = ply.write_to_memory()?;
    assert_eq!(written, b"\
        ply\n\
        format ascii 1.0\n\
        comment   indented text\n\
        comment \n\
        obj_info num_cols 3\n\
        element v 0\n\
        property int a\n\
        end_header\n\
    " as &[u8]);
    assert_eq!(Ply::read(&*written)?, ply);

    Ok(())
}

#[test]
fn format_line_comes_right_after_magic() {
    let res = ascii("ply\ncomment x\nformat ascii 1.0\nelement v 1\nproperty int a\nend_header\n5\n");
    assert_format_error(res, "expected format line");

    let res = ascii("ply\nobj_info x\nformat ascii 1.0\nend_header\n");
    assert_format_error(res, "expected format line");

    // Empty lines in between are fine.
    let ply = ascii("ply\n\nformat ascii 1.0\nend_header\n").unwrap();
    assert_eq!(ply.format, Some(Format::Ascii));
}

#[test]
fn ascii_body_whitespace() -> Result<(), Error> {
    let ply = ascii("\
        ply\n\
        format ascii 1.0\n\
        element v 3\n\
        property int a\n\
        property list uchar float b\n\
        end_header\n\
        \n\
        1\t2 0.5   1.5\n\
        \x20\x20\n\
        \x20 2 0 7 8 9\r\n\
        3 1 -0\n\
    ")?;

    assert_eq!(ply.elements[0].rows, vec![
        row(vec![1i32.into(), vec![0.5f32, 1.5].into()]),
        row(vec![2i32.into(), Vec::<f32>::new().into()]),
        row(vec![3i32.into(), vec![-0.0f32].into()]),
    ]);

    Ok(())
}

#[test]
fn elements_without_properties() -> Result<(), Error> {
    let ply = ascii("\
        ply\n\
        format ascii 1.0\n\
        element empty 2\n\
        element v 1\n\
        property uchar a\n\
        end_header\n\
        \n\
        \n\
        7\n\
    ")?;

    assert_eq!(ply.elements[0].rows, vec![Row::new(), Row::new()]);
    assert_eq!(ply.elements[1].rows, vec![row(vec![Property::UChar(7)])]);

    // In ASCII, each record is an empty line. In binary, records take no space.
    let written = ply.write_to_memory()?;
    assert!(written.ends_with(b"end_header\n\n\n7\n"));

    let mut binary = ply.clone();
    binary.set_format(Format::BinaryLittleEndian);
    assert!(binary.write_to_memory()?.ends_with(b"end_header\n\x07"));

    for &format in &[Format::Ascii, Format::BinaryLittleEndian, Format::BinaryBigEndian] {
        let mut copy = ply.clone();
        copy.set_format(format);
        assert_eq!(Ply::read(&*copy.write_to_memory()?)?, copy);
    }

    Ok(())
}

#[test]
fn records_without_properties_take_one_ascii_line() -> Result<(), Error> {
    // Whatever is on the line of such a record is ignored.
    let ply = ascii("\
        ply\n\
        format ascii 1.0\n\
        element e 1\n\
        element v 1\n\
        property int a\n\
        end_header\n\
        foo\n\
        5\n\
    ")?;

    assert_eq!(ply.elements[0].rows, vec![Row::new()]);
    assert_eq!(ply.elements[1].rows, vec![row(vec![Property::Int(5)])]);

    Ok(())
}

#[test]
fn element_kind_is_informational() -> Result<(), Error> {
    use crate::raw::ElementKind;

    let reader = Reader::new(include_test_file!("cube_ascii.ply"))?;
    assert_eq!(reader.elements()[0].kind(), Some(ElementKind::Vertex));
    assert_eq!(reader.elements()[1].kind(), Some(ElementKind::Face));

    let reader = Reader::new(include_test_file!("all_types_ascii.ply"))?;
    assert_eq!(reader.elements()[0].kind(), None);

    Ok(())
}


// ===========================================================================
// ===== Header errors
// ===========================================================================

#[test]
fn not_a_ply_file() {
    assert_format_error(ascii(""), "not a PLY file");
    assert_format_error(ascii("plyformat ascii 1.0\n"), "not a PLY file");
    assert_format_error(ascii("ply ply\nformat ascii 1.0\n"), "not a PLY file");
    assert_format_error(Ply::read(&b"\x89PNG\r\n\x1a\n"[..]), "not a PLY file");
}

#[test]
fn bad_format_line() {
    assert_format_error(ascii("ply\nformat ascii 1.1\nend_header\n"), "version");
    assert_format_error(ascii("ply\nformat ascii\nend_header\n"), "3 tokens");
    assert_format_error(ascii("ply\nformat utf8 1.0\nend_header\n"), "\"utf8\"");
    assert_format_error(ascii("ply\nelement v 1\nend_header\n"), "format line");
    assert_format_error(ascii("ply\nend_header\n"), "format line");
    assert_format_error(
        ascii("ply\nformat ascii 1.0\nformat ascii 1.0\nend_header\n"),
        "duplicate format",
    );
}

#[test]
fn bad_element_and_property_lines() {
    let with = |lines: &str| ascii(&format!("ply\nformat ascii 1.0\n{}\nend_header\n", lines));

    assert_format_error(with("property int a"), "without preceding element");
    assert_format_error(with("element v"), "3 tokens");
    assert_format_error(with("element v -1"), "element count");
    assert_format_error(with("element v x"), "element count");
    assert_format_error(with("element v 1\nproperty int128 a"), "int128");
    assert_format_error(with("element v 1\nproperty Int a"), "Int");
    assert_format_error(with("element v 1\nproperty int"), "3 tokens");
    assert_format_error(with("element v 1\nproperty list uchar int"), "5 tokens");
    assert_format_error(with("element v 1\nproperty list float int a"), "unsigned");
    assert_format_error(with("element v 1\nproperty list char int a"), "unsigned");
    assert_format_error(with("element v 1\nproperty int a\nproperty float a"), "duplicate");
    assert_format_error(with("element v 1\nvertex 1 2 3"), "\"vertex\"");
    assert_format_error(with("element v 1\nend_header now"), "1 tokens");
}

#[test]
fn same_property_name_in_different_elements() -> Result<(), Error> {
    let ply = ascii("\
        ply\n\
        format ascii 1.0\n\
        element a 0\n\
        property int x\n\
        element b 0\n\
        property int x\n\
        end_header\n\
    ")?;
    assert_eq!(ply.elements.len(), 2);

    Ok(())
}

#[test]
fn unterminated_header() {
    assert_format_error(ascii("ply\nformat ascii 1.0\nelement v 1\n"), "end of file");
    assert_format_error(ascii("ply\nformat ascii 1.0\nend_hea"), "end_hea");
}

#[test]
fn non_ascii_comments() -> Result<(), Error> {
    let data = b"\
        ply\n\
        format ascii 1.0\n\
        comment \xe4\xb8\xad\xe6\x96\x87\n\
        obj_info gr\xc3\xbc\xc3\x9fe\n\
        comment broken \xff\n\
        element v 1\n\
        property int a\n\
        end_header\n\
        5\n\
    ";
    let ply = Ply::read(&data[..])?;

    assert_eq!(ply.comments, vec!["中文", "broken \u{FFFD}"]);
    assert_eq!(ply.obj_infos, vec!["grüße"]);
    assert_eq!(ply.elements.len(), 1);
    assert_eq!(ply.elements[0].rows, vec![row(vec![Property::Int(5)])]);

    // Valid UTF-8 is written back verbatim.
    let mut copy = ply.clone();
    copy.comments.pop();
    let written = copy.write_to_memory()?;
    assert!(written.starts_with(
        "ply\nformat ascii 1.0\ncomment 中文\nobj_info grüße\nelement v 1\n".as_bytes()
    ));
    assert_eq!(Ply::read(&*written)?, copy);

    Ok(())
}

#[test]
fn non_ascii_schema_lines() {
    let res = Ply::read(&b"ply\nformat ascii 1.0\nelement v 1\nproperty int \xc3\xa4\nend_header\n5\n"[..]);
    assert_format_error(res, "non-ASCII");

    let res = Ply::read(&b"ply\nformat ascii 1.0\nelement gr\xc3\xbc\xc3\x9fe 0\nend_header\n"[..]);
    assert_format_error(res, "non-ASCII");
}


// ===========================================================================
// ===== Body errors
// ===========================================================================

const SCENARIO_HEADER: &str = "\
    ply\n\
    format ascii 1.0\n\
    element vertex 2\n\
    property float32 x\n\
    property float32 y\n\
    property list uint8 int32 idx\n\
    end_header\n\
";

#[test]
fn ascii_too_few_values() {
    let res = ascii(&format!("{}1.0 2.0 2 10\n3.0 4.0 1 30\n", SCENARIO_HEADER));
    assert_data_error(res, "element 'vertex', record 0, property 'idx'");

    let res = ascii(&format!("{}1.0 2.0 2 10 20\n3.0\n", SCENARIO_HEADER));
    assert_data_error(res, "too few values");
}

#[test]
fn ascii_missing_records() {
    let res = ascii(&format!("{}1.0 2.0 2 10 20\n\n\n", SCENARIO_HEADER));
    assert_data_error(res, "record 1");
}

#[test]
fn ascii_invalid_values() {
    let res = ascii(&format!("{}1.0 two 2 10 20\n3.0 4.0 1 30\n", SCENARIO_HEADER));
    assert_data_error(res, "property 'y'");

    // The list length doesn't fit into `uint8`.
    let res = ascii(&format!("{}1.0 2.0 300 10 20\n3.0 4.0 1 30\n", SCENARIO_HEADER));
    assert_data_error(res, "invalid 'u8' literal");

    let res = ascii(&format!("{}1.0 2.0 -1 10 20\n3.0 4.0 1 30\n", SCENARIO_HEADER));
    assert_data_error(res, "property 'idx'");

    let res = ascii(&format!("{}1.0 2.0 1 2.5\n3.0 4.0 1 30\n", SCENARIO_HEADER));
    assert_data_error(res, "invalid 'i32' literal");
}

#[test]
fn ascii_extra_values_are_ignored() -> Result<(), Error> {
    let ply = ascii(&format!("{}1.0 2.0 2 10 20 99 99\n3.0 4.0 1 30 x\n", SCENARIO_HEADER))?;
    assert_eq!(ply.elements[0].rows[1], row(vec![
        3.0f32.into(),
        4.0f32.into(),
        vec![30i32].into(),
    ]));

    Ok(())
}

#[test]
fn truncated_binary_body() -> Result<(), Error> {
    let full = cube(Format::BinaryLittleEndian).write_to_memory()?;

    for &cut in &[1, 5, 16] {
        let res = Ply::read(&full[..full.len() - cut]);
        assert_data_error(res, "element 'face', record 5");
    }

    // Cut in the middle of the vertices.
    let header_len = full.windows(11).position(|w| w == b"end_header\n").unwrap() + 11;
    let res = Ply::read(&full[..header_len + 16]);
    assert_data_error(res, "element 'vertex', record 1");

    Ok(())
}

#[test]
fn huge_list_length_in_binary_body() {
    let mut data = b"\
        ply\n\
        format binary_big_endian 1.0\n\
        element v 1\n\
        property list uint uchar a\n\
        end_header\n\
    ".to_vec();
    data.extend_from_slice(&[0xFF, 0xFF, 0xFF, 0xFF, 1, 2, 3]);

    assert_data_error(Ply::read(&*data), "property 'a'");
}

#[test]
fn huge_count_for_element_without_properties() {
    let res = ascii("ply\nformat ascii 1.0\nelement v 18446744073709551615\nend_header\n");
    assert_data_error(res, "no properties");
}


// ===========================================================================
// ===== Endianness
// ===========================================================================

#[test]
fn non_native_endianness() -> Result<(), Error> {
    let format = non_native_binary();
    let data = cube(format).write_to_memory()?;

    // By default, values are swapped.
    assert_eq!(Ply::read(&*data)?, cube(format));

    // Strict mode rejects the file before reading the body.
    let strict = ReadOptions { strict_endianness: true };
    match Ply::read_with(&*data, strict) {
        Err(Error::EndiannessMismatch { declared, host }) => {
            assert_eq!(declared, format);
            assert_eq!(host, Format::binary_native());
        }
        other => panic!("expected endianness mismatch, got {:?}", other),
    }

    // The header can still be inspected.
    let reader = Reader::with_options(&*data, strict)?;
    assert_eq!(reader.format(), format);
    assert!(reader.read_body().is_err());

    // Native binary and ASCII files are fine in strict mode.
    let native = cube(Format::binary_native()).write_to_memory()?;
    assert_eq!(Ply::read_with(&*native, strict)?, cube(Format::binary_native()));
    let ascii = cube(Format::Ascii).write_to_memory()?;
    assert_eq!(Ply::read_with(&*ascii, strict)?, cube(Format::Ascii));

    Ok(())
}

#[test]
fn strict_endianness_when_writing() -> Result<(), Error> {
    let ply = cube(Format::Ascii);
    let defs = ply.elements.iter().map(|e| e.def.clone()).collect::<Vec<_>>();
    let rows = ply.elements.iter().map(|e| &*e.rows).collect::<Vec<_>>();

    let mut out = Vec::new();
    let res = Config::new(non_native_binary())
        .strict_endianness(true)
        .into_writer(&mut out)
        .write(&defs, &rows);
    assert!(matches!(res, Err(Error::EndiannessMismatch { .. })));
    assert!(out.is_empty());

    Config::binary()
        .strict_endianness(true)
        .into_writer(&mut out)
        .write(&defs, &rows)?;
    assert_eq!(Ply::read(&*out)?.elements, ply.elements);

    Ok(())
}


// ===========================================================================
// ===== Writer errors
// ===========================================================================

#[test]
fn write_without_format() {
    let mut ply = cube(Format::Ascii);
    ply.format = None;

    match ply.write_to_memory() {
        Err(Error::Format(msg)) => assert!(msg.contains("undefined")),
        other => panic!("expected format error, got {:?}", other),
    }
}

#[test]
fn write_with_wrong_row_count() {
    let mut ply = cube(Format::Ascii);
    ply.elements[1].rows.pop();

    match ply.write_to_memory() {
        Err(Error::Format(msg)) => assert!(msg.contains("'face' declares 6 records, but has 5")),
        other => panic!("expected format error, got {:?}", other),
    }

    let mut ply = cube(Format::Ascii);
    ply.elements[0].def.count = 9;
    assert!(matches!(ply.write_to_memory(), Err(Error::Format(_))));
}

#[test]
fn write_with_mismatching_values() {
    // Scalar value of the wrong type
    let mut ply = cube(Format::BinaryLittleEndian);
    ply.elements[0].rows[3] = row(vec![
        0.0f64.into(), 0.0f32.into(), 0.0f32.into(), 0u8.into(), 0u8.into(), 0u8.into(),
    ]);
    match ply.write_to_memory() {
        Err(Error::Data(msg)) => assert!(msg.contains("row 3: property 'x'"), "{}", msg),
        other => panic!("expected data error, got {:?}", other),
    }

    // List instead of scalar
    let mut ply = cube(Format::Ascii);
    ply.elements[0].rows[0] = row(vec![
        vec![0.0f32].into(), 0.0f32.into(), 0.0f32.into(), 0u8.into(), 0u8.into(), 0u8.into(),
    ]);
    assert!(matches!(ply.write_to_memory(), Err(Error::Data(_))));

    // Too few values
    let mut ply = cube(Format::Ascii);
    ply.elements[1].rows[0] = Row::new();
    assert!(matches!(ply.write_to_memory(), Err(Error::Data(_))));
}

#[test]
fn write_list_too_long() -> Result<(), Error> {
    let mut ply = Ply::new();
    ply.set_format(Format::BinaryBigEndian);

    let mut e = Element::new("e", 1);
    e.add_property(PropertyDef::list("l", ListLenType::UChar, ScalarType::Char));
    e.push_row(row(vec![vec![1i8; 256].into()]));
    ply.add_element(e);

    match ply.write_to_memory() {
        Err(Error::Data(msg)) => assert!(msg.contains("256 items"), "{}", msg),
        other => panic!("expected data error, got {:?}", other),
    }

    // 255 items are fine.
    ply.elements[0].rows[0] = row(vec![vec![1i8; 255].into()]);
    let read = Ply::read(&*ply.write_to_memory()?)?;
    assert_eq!(read.elements[0].rows[0], row(vec![vec![1i8; 255].into()]));

    Ok(())
}

#[test]
fn write_invalid_names_and_comments() {
    let mut ply = cube(Format::Ascii);
    ply.elements[0].def.name = "my vertex".into();
    assert!(matches!(ply.write_to_memory(), Err(Error::Format(_))));

    let mut ply = cube(Format::Ascii);
    ply.elements[1].def.property_defs[crate::raw::PropIndex(0)].name = String::new();
    assert!(matches!(ply.write_to_memory(), Err(Error::Format(_))));

    let mut ply = cube(Format::Ascii);
    ply.comments.push("two\nlines".into());
    assert!(matches!(ply.write_to_memory(), Err(Error::Format(_))));

    let mut ply = cube(Format::Ascii);
    ply.elements[0].def.property_defs[crate::raw::PropIndex(4)].name = "red".into();
    assert_format_error(ply.write_to_memory().map(|_| Ply::new()), "duplicate property 'red'");
}

#[test]
fn header_lines_with_line_breaks() {
    let mut ply = cube(Format::Ascii);
    ply.add_comment("a\r\nb");
    assert_format_error(ply.write_to_memory().map(|_| Ply::new()), "line breaks");

    let mut ply = cube(Format::BinaryBigEndian);
    ply.add_obj_info("a\rb");
    assert_format_error(ply.write_to_memory().map(|_| Ply::new()), "line breaks");

    let mut ply = cube(Format::Ascii);
    ply.add_obj_info("single line");
    let read = Ply::read(&*ply.write_to_memory().unwrap()).unwrap();
    assert_eq!(read.obj_infos.last().map(|s| s.as_str()), Some("single line"));
}


// ===========================================================================
// ===== Positions and plane fitting
// ===========================================================================

#[test]
fn positions_of_any_numeric_type() -> Result<(), Error> {
    let ply = ascii("\
        ply\n\
        format ascii 1.0\n\
        element vertex 4\n\
        property uchar z\n\
        property double y\n\
        property int x\n\
        property list uchar int w\n\
        end_header\n\
        1 0 0 0\n\
        3 0 1 1 5\n\
        0 1 0 0\n\
        2 1 1 0\n\
    ")?;

    let positions = ply.element("vertex").unwrap().positions().unwrap();
    assert_eq!(positions, vec![
        cgmath::Point3::new(0.0, 0.0, 1.0),
        cgmath::Point3::new(1.0, 0.0, 3.0),
        cgmath::Point3::new(0.0, 1.0, 0.0),
        cgmath::Point3::new(1.0, 1.0, 2.0),
    ]);

    // z = 2x - y + 1
    let plane = crate::math::fit_plane(&positions).unwrap();
    let expected = [2.0, -1.0, -1.0, 1.0];
    for (a, b) in plane.iter().zip(&expected) {
        assert!((a - b).abs() < 1e-9, "{:?} != {:?}", plane, expected);
    }

    Ok(())
}

#[test]
fn positions_need_scalar_xyz() -> Result<(), Error> {
    let ply = Ply::read(include_test_file!("vertex_with_index_list.ply"))?;
    assert_eq!(ply.elements[0].positions(), None);

    let ply = ascii("\
        ply\n\
        format ascii 1.0\n\
        element vertex 1\n\
        property float x\n\
        property float y\n\
        property list uchar float z\n\
        end_header\n\
        1 2 1 3\n\
    ")?;
    assert_eq!(ply.elements[0].positions(), None);

    Ok(())
}
