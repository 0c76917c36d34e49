//! Everything related to writing a PLY file.
//!
//! # Random notes on the format
//!
//! Unfortunately, the PLY format is terribly underspecified (as are most mesh
//! formats). Therefore, here are a few notes on missing information or this
//! particular implementation.
//!
//! - The PLY format description says "The header is a series of
//!   carriage-return terminated lines", but its own example files and all
//!   files in the wild use `'\n'` as terminator and not `'\r'`
//!   (carriage-return). We write `'\n'`.
//! - For ASCII encoding we simply use the `fmt::Display` impl of all types.
//!   For floats, this is the shortest representation that parses back to the
//!   same value.
//! - Type names are always written in their classic form (`uchar`, `float`,
//!   ...), not the sized form (`uint8`, `float32`, ...), as some older
//!   programs only understand the former.
//! - Elements without properties don't produce any data in binary bodies. In
//!   the ASCII encoding, each of their records is an empty line.
//! - Comments and `obj_info` lines are written verbatim (they may contain
//!   non-ASCII text) and must not contain line breaks.

use std::io::{self, Write};

use byteorder::{BigEndian, LittleEndian};
use log::debug;

use crate::{
    Error, Format,
    raw::{ElementDef, ListLenType, PlyScalar, Property, PropertyType, Row},
};



// ===============================================================================================
// ===== PLY Config
// ===============================================================================================

/// Used to configure and create a [`Writer`].
///
/// This is used to configure basic settings for the file to be written. Most
/// importantly, this is the file format. Additionally, you can add comments
/// to the file header. With [`Config::into_writer`] you can create a
/// [`Writer`].
#[derive(Clone, Debug)]
pub struct Config {
    format: Format,
    comments: Vec<String>,
    obj_infos: Vec<String>,
    strict_endianness: bool,
}

impl Config {
    /// Creates a new configuration with binary format (native endianness).
    pub fn binary() -> Self {
        Self::new(Format::binary_native())
    }

    /// Creates a new configuration with ASCII format. *Try avoid using ASCII
    /// format!*
    ///
    /// ASCII encoding is usually a lot less space efficient and a lot slower
    /// to read and write. Therefore you should instead using a binary
    /// encoding. Apart from comments, the PLY file header is always ASCII.
    pub fn ascii() -> Self {
        Self::new(Format::Ascii)
    }

    /// Creates a new configuration with the given format.
    pub fn new(format: Format) -> Self {
        Self {
            format,
            comments: vec![],
            obj_infos: vec![],
            strict_endianness: false,
        }
    }

    /// Adds a `comment` line to the file header.
    ///
    /// The comment must not contain line breaks, otherwise writing fails.
    pub fn add_comment(mut self, comment: impl Into<String>) -> Self {
        self.comments.push(comment.into());
        self
    }

    /// Adds an `obj_info` line to the file header. These are written after
    /// all comments.
    ///
    /// The text must not contain line breaks, otherwise writing fails.
    pub fn add_obj_info(mut self, info: impl Into<String>) -> Self {
        self.obj_infos.push(info.into());
        self
    }

    /// If set to `true`, writing a binary format that doesn't match the
    /// native byte order of this machine fails with
    /// [`Error::EndiannessMismatch`] instead of byte-swapping all values.
    pub fn strict_endianness(mut self, strict: bool) -> Self {
        self.strict_endianness = strict;
        self
    }

    pub fn format(&self) -> Format {
        self.format
    }

    /// Creates a writer with the given `io::Write` instance and `self` as
    /// configuration.
    pub fn into_writer<W: io::Write>(self, writer: W) -> Writer<W> {
        Writer {
            config: self,
            writer,
        }
    }
}


// ===============================================================================================
// ===== PLY Writer
// ===============================================================================================

/// A writer able to write binary and ASCII PLY files.
///
/// You usually don't need to use this directly and instead use
/// [`Ply::write_to`][crate::Ply::write_to] and friends.
///
///
/// # Example
///
/// ```
/// use plyio::{
///     Config, Error,
///     raw::{ElementDef, PropertyDef, ListLenType, ScalarType, Row},
/// };
///
/// fn write_triangle(out: &mut Vec<u8>) -> Result<(), Error> {
///     let mut face = ElementDef::new("face", 1);
///     face.property_defs.push(
///         PropertyDef::list("vertex_indices", ListLenType::UChar, ScalarType::UInt),
///     );
///
///     let mut row = Row::new();
///     row.push(vec![0u32, 1, 2]);
///     let rows: &[Row] = &[row];
///
///     Config::ascii()
///         .add_comment("a single triangle")
///         .into_writer(out)
///         .write(&[face], &[rows])
/// }
///
/// let mut out = Vec::new();
/// write_triangle(&mut out).unwrap();
/// assert!(out.ends_with(b"end_header\n3 0 1 2\n"));
/// ```
#[derive(Debug)]
pub struct Writer<W: io::Write> {
    config: Config,
    writer: W,
}

impl<W: io::Write> Writer<W> {
    /// Creates a new PLY writer with the given PLY config which will write to
    /// the given `io::Write` instance.
    pub fn new(config: Config, writer: W) -> Self {
        Self { config, writer }
    }

    /// Writes a PLY file with the given elements. `rows[i]` holds all records
    /// of the element `header[i]`.
    ///
    /// Everything is checked before the first byte is written: the number of
    /// records has to match each element's count, and each value has to
    /// match its property's type (and, for lists, fit the length type).
    pub fn write(mut self, header: &[ElementDef], rows: &[&[Row]]) -> Result<(), Error> {
        check_header(&self.config, header)?;
        check_rows(header, rows)?;

        let native = Format::binary_native();
        if self.config.strict_endianness && self.config.format.is_binary()
            && self.config.format != native
        {
            return Err(Error::EndiannessMismatch {
                declared: self.config.format,
                host: native,
            });
        }

        debug!(
            "writing PLY file ({}) with {} element(s)",
            self.config.format,
            header.len(),
        );

        let w = &mut self.writer;

        // ===================================================================
        // ===== Write header (this part is always ASCII)
        // ===================================================================
        // Magic signature
        w.write_all(b"ply\n")?;

        // The line defining the format of the file
        writeln!(w, "format {} 1.0", self.config.format.header_token())?;

        for comment in &self.config.comments {
            writeln!(w, "comment {}", comment)?;
        }
        for info in &self.config.obj_infos {
            writeln!(w, "obj_info {}", info)?;
        }

        // Define all elements with their properties
        for element_def in header {
            writeln!(w, "element {} {}", element_def.name, element_def.count)?;
            for prop in &*element_def.property_defs {
                match prop.ty {
                    PropertyType::Scalar(ty) => {
                        writeln!(w, "property {} {}", ty.ply_type_name(), prop.name)?;
                    }
                    PropertyType::List { scalar_type, len_type } => {
                        writeln!(
                            w,
                            "property list {} {} {}",
                            len_type.to_scalar_type().ply_type_name(),
                            scalar_type.ply_type_name(),
                            prop.name,
                        )?;
                    }
                }
            }
        }

        w.write_all(b"end_header\n")?;


        // ===================================================================
        // ===== Write body
        // ===================================================================
        match self.config.format {
            Format::Ascii => serialize_body(AsciiSerializer::new(w), header, rows)?,
            Format::BinaryBigEndian => serialize_body(BinaryBeSerializer::new(w), header, rows)?,
            Format::BinaryLittleEndian => {
                serialize_body(BinaryLeSerializer::new(w), header, rows)?
            }
        }

        w.flush()?;
        Ok(())
    }
}

/// Makes sure the header we are about to write can be parsed again.
fn check_header(config: &Config, header: &[ElementDef]) -> Result<(), Error> {
    fn is_valid_name(name: &str) -> bool {
        !name.is_empty() && name.is_ascii() && !name.contains(char::is_whitespace)
    }

    let lines = config.comments.iter().chain(&config.obj_infos);
    for line in lines {
        if line.contains(|c: char| c == '\n' || c == '\r') {
            return Err(Error::Format(format!(
                "header comments must not contain line breaks, but {:?} does",
                line,
            )));
        }
    }

    for def in header {
        if !is_valid_name(&def.name) {
            return Err(Error::Format(format!("invalid element name {:?}", def.name)));
        }

        for (i, prop) in def.property_defs.iter().enumerate() {
            if !is_valid_name(&prop.name) {
                return Err(Error::Format(format!(
                    "invalid property name {:?} in element '{}'",
                    prop.name,
                    def.name,
                )));
            }

            if def.property_defs.iter().take(i).any(|other| other.name == prop.name) {
                return Err(Error::Format(format!(
                    "duplicate property '{}' in element '{}'",
                    prop.name,
                    def.name,
                )));
            }
        }
    }

    Ok(())
}

/// Checks that the rows fit the element definitions.
fn check_rows(header: &[ElementDef], rows: &[&[Row]]) -> Result<(), Error> {
    if header.len() != rows.len() {
        return Err(Error::Format(format!(
            "{} elements are defined, but rows for {} elements are given",
            header.len(),
            rows.len(),
        )));
    }

    for (def, rows) in header.iter().zip(rows) {
        if rows.len() as u64 != def.count {
            return Err(Error::Format(format!(
                "element '{}' declares {} records, but has {} rows",
                def.name,
                def.count,
                rows.len(),
            )));
        }

        for (row_idx, row) in rows.iter().enumerate() {
            if row.len() != def.property_defs.len() {
                return Err(Error::Data(format!(
                    "element '{}', row {}: expected {} values, found {}",
                    def.name,
                    row_idx,
                    def.property_defs.len(),
                    row.len(),
                )));
            }

            for (prop_def, value) in def.property_defs.iter().zip(row) {
                if !value.matches(&prop_def.ty) {
                    return Err(Error::Data(format!(
                        "element '{}', row {}: property '{}' has type {}, but the value {:?} \
                            doesn't match",
                        def.name,
                        row_idx,
                        prop_def.name,
                        prop_def.ty,
                        value,
                    )));
                }

                if let (Some(len_type), Some(len)) = (prop_def.ty.len_type(), value.list_len()) {
                    if len as u64 > len_type.max_len() {
                        return Err(Error::Data(format!(
                            "element '{}', row {}: list '{}' has {} items, but its length \
                                type {} can only store up to {}",
                            def.name,
                            row_idx,
                            prop_def.name,
                            len,
                            len_type.to_scalar_type(),
                            len_type.max_len(),
                        )));
                    }
                }
            }
        }
    }

    Ok(())
}

fn serialize_body<S: Serializer>(
    mut ser: S,
    header: &[ElementDef],
    rows: &[&[Row]],
) -> Result<(), Error> {
    for (def, rows) in header.iter().zip(rows) {
        for row in rows.iter() {
            serialize_element(&mut ser, def, row)?;
        }
    }

    Ok(())
}

/// Serializes one record. The row has to be checked with `check_rows` before.
fn serialize_element<S: Serializer>(ser: &mut S, def: &ElementDef, row: &Row) -> Result<(), Error> {
    fn add_len<S: Serializer>(ser: &mut S, ty: ListLenType, len: usize) -> Result<(), Error> {
        // All the casts are fine, as the length was checked against the
        // maximum of the length type.
        match ty {
            ListLenType::UChar => ser.add(len as u8),
            ListLenType::UShort => ser.add(len as u16),
            ListLenType::UInt => ser.add(len as u32),
            ListLenType::ULong => ser.add(len as u64),
        }
    }

    for (prop_def, value) in def.property_defs.iter().zip(row) {
        if let Some(len_type) = prop_def.ty.len_type() {
            add_len(ser, len_type, value.list_len().unwrap_or(0))?;
        }

        match value {
            Property::Char(v) => ser.add(*v)?,
            Property::UChar(v) => ser.add(*v)?,
            Property::Short(v) => ser.add(*v)?,
            Property::UShort(v) => ser.add(*v)?,
            Property::Int(v) => ser.add(*v)?,
            Property::UInt(v) => ser.add(*v)?,
            Property::Long(v) => ser.add(*v)?,
            Property::ULong(v) => ser.add(*v)?,
            Property::Float(v) => ser.add(*v)?,
            Property::Double(v) => ser.add(*v)?,
            Property::CharList(l) => ser.add_slice(l)?,
            Property::UCharList(l) => ser.add_slice(l)?,
            Property::ShortList(l) => ser.add_slice(l)?,
            Property::UShortList(l) => ser.add_slice(l)?,
            Property::IntList(l) => ser.add_slice(l)?,
            Property::UIntList(l) => ser.add_slice(l)?,
            Property::LongList(l) => ser.add_slice(l)?,
            Property::ULongList(l) => ser.add_slice(l)?,
            Property::FloatList(l) => ser.add_slice(l)?,
            Property::DoubleList(l) => ser.add_slice(l)?,
        }
    }

    ser.end_element()
}


// ===============================================================================================
// ===== Definition of ASCII and binary serializers
// ===============================================================================================
// These serializers are just used to abstract over the encoding (and things
// like separators and line endings).

/// Something values of all PLY types can be written into. Implemented once
/// for each format.
trait Serializer {
    fn add<P: PlyScalar>(&mut self, v: P) -> Result<(), Error>;

    fn add_slice<P: PlyScalar>(&mut self, s: &[P]) -> Result<(), Error> {
        for &v in s {
            self.add(v)?;
        }

        Ok(())
    }

    /// Is called after all values of one record have been added.
    fn end_element(&mut self) -> Result<(), Error>;
}

#[derive(Debug)]
struct AsciiSerializer<'a, W: Write> {
    writer: &'a mut W,
    at_start_of_line: bool,
}

impl<'a, W: Write> AsciiSerializer<'a, W> {
    fn new(w: &'a mut W) -> Self {
        Self {
            writer: w,
            at_start_of_line: true,
        }
    }

    fn write_separator(&mut self) -> Result<(), Error> {
        if self.at_start_of_line {
            self.at_start_of_line = false;
        } else {
            self.writer.write_all(b" ")?;
        }

        Ok(())
    }
}

impl<W: io::Write> Serializer for AsciiSerializer<'_, W> {
    fn add<P: PlyScalar>(&mut self, v: P) -> Result<(), Error> {
        self.write_separator()?;
        write!(self.writer, "{}", v)?;
        Ok(())
    }

    fn end_element(&mut self) -> Result<(), Error> {
        self.writer.write_all(b"\n")?;
        self.at_start_of_line = true;
        Ok(())
    }
}

macro_rules! gen_binary_block {
    ($name:ident, $endianness:ident) => {
        #[derive(Debug)]
        struct $name<'a, W: Write> {
            writer: &'a mut W,
        }

        impl<'a, W: Write> $name<'a, W> {
            fn new(w: &'a mut W) -> Self {
                Self {
                    writer: w,
                }
            }
        }

        impl<W: io::Write> Serializer for $name<'_, W> {
            fn add<P: PlyScalar>(&mut self, v: P) -> Result<(), Error> {
                v.write_binary::<$endianness, _>(&mut self.writer)?;
                Ok(())
            }

            fn end_element(&mut self) -> Result<(), Error> {
                // NOOP
                Ok(())
            }
        }
    }
}

gen_binary_block!(BinaryBeSerializer, BigEndian);
gen_binary_block!(BinaryLeSerializer, LittleEndian);
