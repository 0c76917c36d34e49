//! Everything related to reading a PLY file.
//!
//! Reading happens in two steps: [`Reader::new`] parses the header and
//! resolves all type names, [`Reader::read_body`] then decodes all records.
//! In between, the header can be inspected.
//!
//! # Notes on the format
//!
//! - Header lines can be terminated by `'\n'`, `"\r\n"` or `'\r'`. Empty lines
//!   in the header are ignored. Exactly one terminator after `end_header` is
//!   consumed: the binary body might start with `0x0A` or `0x0D`.
//! - Header lines are split into whitespace separated tokens, so leading and
//!   trailing whitespace doesn't matter.
//! - The type names with explicit size (`int8`, `float32`, ...) are accepted
//!   in addition to the classic ones.
//! - `comment` and `obj_info` lines may contain arbitrary bytes (their text
//!   is decoded lossily as UTF-8). All other header lines must be ASCII.
//! - In ASCII bodies, each record is one line. Empty lines between records
//!   are skipped and additional values at the end of a line are ignored.
//!   Records of elements without properties are exactly one line each,
//!   usually an empty one.

use std::{
    borrow::Cow,
    fmt,
    fs::File,
    io,
    marker::PhantomData,
    mem,
    path::Path,
};

use byteorder::{BigEndian, ByteOrder, LittleEndian};
use log::{debug, trace, warn};
use smallvec::SmallVec;

use crate::{
    Error, Format, Ply,
    document::Element,
    parse::{
        self, Input, Span, is_linebreak,
        buf::Buffer,
    },
    raw::{
        ElementDef, ListLenType, Property, PropertyDef, PropertyType, Row, ScalarType,
    },
};


/// The maximum number of records of an element without properties.
const MAX_EMPTY_RECORDS: u64 = 1 << 20;

/// Options for reading PLY files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReadOptions {
    /// If `true`, binary files whose byte order differs from the native byte
    /// order of this machine are rejected with [`Error::EndiannessMismatch`]
    /// instead of being byte-swapped while reading.
    pub strict_endianness: bool,
}


// ===========================================================================
// ===== Definition of `Reader`
// ===========================================================================

/// A reader able to read PLY files.
///
/// Creating a reader ([`Reader::open`], [`Reader::new`] or
/// [`Reader::with_options`]) parses the header. Afterwards, the header
/// information can be queried, and the body can be read with
/// [`Reader::read_body`] or [`Reader::read_raw_into`].
#[derive(Debug)]
pub struct Reader<R: io::Read> {
    buf: Buffer<R>,
    format: Format,
    comments: Vec<String>,
    obj_infos: Vec<String>,
    elements: Vec<ElementDef>,
    options: ReadOptions,
}

impl Reader<File> {
    /// Tries to open the file specified by the given path and creates a new
    /// `Reader` from that file.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, Error> {
        // We don't need a `BufReader` here, because we will use our internal
        // parse buffer anyway.
        Self::new(File::open(path)?)
    }
}

impl<R: io::Read> Reader<R> {
    /// Creates a new `Reader` from the given `io::Read` instance and parses
    /// the header of the given input.
    ///
    /// If you want to open a file, rather use [`Reader::open`].
    pub fn new(reader: R) -> Result<Self, Error> {
        Self::with_options(reader, ReadOptions::default())
    }

    pub fn with_options(reader: R, options: ReadOptions) -> Result<Self, Error> {
        let mut buf = Buffer::new(reader).map_err(Error::from_header)?;
        let header = parse_header(&mut buf).map_err(Error::from_header)?;

        debug!(
            "parsed PLY header: format {}, {} comment(s), elements: [{}]",
            header.format,
            header.comments.len(),
            header.elements.iter()
                .map(|e| format!("{} ({})", e.name, e.count))
                .collect::<Vec<_>>()
                .join(", "),
        );

        Ok(Self {
            buf,
            format: header.format,
            comments: header.comments,
            obj_infos: header.obj_infos,
            elements: header.elements,
            options,
        })
    }

    /// The encoding of the body.
    pub fn format(&self) -> Format {
        self.format
    }

    /// Text of all `comment` lines in the header.
    pub fn comments(&self) -> &[String] {
        &self.comments
    }

    /// Text of all `obj_info` lines in the header.
    pub fn obj_infos(&self) -> &[String] {
        &self.obj_infos
    }

    /// Definitions of all elements in the order of the header.
    pub fn elements(&self) -> &[ElementDef] {
        &self.elements
    }

    pub fn options(&self) -> ReadOptions {
        self.options
    }

    /// Reads the whole body and returns the complete document.
    pub fn read_body(mut self) -> Result<Ply, Error> {
        let mut ply = Ply {
            format: Some(self.format),
            comments: mem::replace(&mut self.comments, Vec::new()),
            obj_infos: mem::replace(&mut self.obj_infos, Vec::new()),
            elements: Vec::with_capacity(self.elements.len()),
        };

        self.read_raw_into(&mut ply)?;
        Ok(ply)
    }

    /// Reads the whole body into the given raw sink.
    ///
    /// This is a low level building block that you usually don't want to use
    /// directly.
    pub fn read_raw_into(mut self, sink: &mut impl RawSink) -> Result<(), Error> {
        let native = Format::binary_native();
        if self.format.is_binary() && self.format != native {
            if self.options.strict_endianness {
                return Err(Error::EndiannessMismatch {
                    declared: self.format,
                    host: native,
                });
            }

            warn!(
                "file is {}, but this machine is {}: values are byte-swapped while reading",
                self.format,
                native,
            );
        }

        let buf = &mut self.buf;

        // Keep this vector on the outside to retain allocations
        let mut properties = Vec::new();

        // Iterate through each element group
        for element_def in &self.elements {
            trace!("reading {} records of element '{}'", element_def.count, element_def.name);
            sink.element_group_start(element_def);

            // Just read as many records as specified in the header. A faulty
            // number in the header won't lead to any DOS dangerous things: the
            // time and memory we use here is still limited by the file size.
            // Except for elements without properties, which don't occupy any
            // bytes, so their count is limited explicitly.
            if element_def.property_defs.is_empty() && element_def.count > MAX_EMPTY_RECORDS {
                return Err(Error::Data(format!(
                    "element '{}' has no properties, but declares {} records (more than {})",
                    element_def.name,
                    element_def.count,
                    MAX_EMPTY_RECORDS,
                )));
            }

            for record in 0..element_def.count {
                properties.clear();

                match self.format {
                    Format::Ascii => {
                        parse_element::<AsciiEncoding, _>(buf, element_def, record, &mut properties)?;
                    }
                    Format::BinaryBigEndian => {
                        parse_element::<BinaryEncoding<BigEndian>, _>(
                            buf,
                            element_def,
                            record,
                            &mut properties,
                        )?;
                    }
                    Format::BinaryLittleEndian => {
                        parse_element::<BinaryEncoding<LittleEndian>, _>(
                            buf,
                            element_def,
                            record,
                            &mut properties,
                        )?;
                    }
                }

                // Send read properties to the sink.
                sink.element(&properties);
            }
        }

        Ok(())
    }
}


// ===========================================================================
// ===== Header parsing
// ===========================================================================

#[derive(Debug)]
struct Header {
    format: Format,
    comments: Vec<String>,
    obj_infos: Vec<String>,
    elements: Vec<ElementDef>,
}

/// A header line split into whitespace separated tokens.
///
/// For `comment` and `obj_info` lines, `tokens` only contains the keyword:
/// their text is not split and might not even be ASCII.
struct Line<'a> {
    text: Cow<'a, str>,
    tokens: Vec<&'a str>,
    span: Span,
}

impl Line<'_> {
    fn error(&self, msg: impl fmt::Display) -> parse::Error {
        self.span.error(format!("{} (line {:?})", msg, self.text))
    }

    fn expect_tokens(&self, count: usize, what: &str) -> Result<(), parse::Error> {
        if self.tokens.len() != count {
            let msg = format!(
                "{} line must consist of exactly {} tokens, but has {}",
                what,
                count,
                self.tokens.len(),
            );
            return Err(self.error(msg));
        }

        Ok(())
    }

    /// Returns the text after the first token and one separator. Used for
    /// `comment` and `obj_info` lines whose text is kept verbatim.
    fn text_after_keyword(&self, keyword: &str) -> &str {
        let rest = &self.text.trim_start()[keyword.len()..];
        match rest.chars().next() {
            Some(' ') | Some('\t') => &rest[1..],
            _ => rest,
        }
    }
}

/// Skips empty lines and calls `func` with the next header line. Returns
/// `None` if the input is exhausted.
fn next_line<I, F, O>(buf: &mut I, func: F) -> Result<Option<O>, parse::Error>
where
    I: Input,
    F: FnOnce(&Line) -> Result<O, parse::Error>,
{
    buf.skip_linebreaks()?;
    if buf.is_eof()? {
        return Ok(None);
    }

    buf.take_line(|sd| {
        let keyword = sd.data
            .split(|b| b.is_ascii_whitespace())
            .find(|token| !token.is_empty())
            .unwrap_or(&[]);

        let line = match keyword {
            b"comment" | b"obj_info" => Line {
                text: String::from_utf8_lossy(sd.data),
                tokens: vec![if keyword == b"comment" { "comment" } else { "obj_info" }],
                span: sd.span,
            },
            _ => {
                let text = sd.assert_ascii()?;
                Line {
                    text: Cow::Borrowed(text),
                    tokens: text.split_whitespace().collect(),
                    span: sd.span,
                }
            }
        };
        func(&line).map(Some)
    })
}

fn parse_scalar_type(line: &Line, token: &str) -> Result<ScalarType, parse::Error> {
    token.parse::<ScalarType>().map_err(|e| line.error(e))
}

fn parse_header(buf: &mut impl Input) -> Result<Header, parse::Error> {
    fn unexpected_eof() -> parse::Error {
        parse::Error::UnexpectedEof(0)
    }

    // ===== Magic number =====================================================
    // PLY files always start with a line `ply`. This serves as magic number.
    let is_ply = next_line(buf, |line| Ok(line.tokens == ["ply"]))
        .map_err(|e| match e {
            parse::Error::Io(e) => parse::Error::Io(e),
            _ => Span::new(0, 3).error("not a PLY file (does not start with \"ply\")"),
        })?;
    if is_ply != Some(true) {
        return Err(Span::new(0, 3).error("not a PLY file (does not start with \"ply\")"));
    }

    let mut format = None;
    let mut comments = Vec::new();
    let mut obj_infos = Vec::new();
    let mut elements: Vec<ElementDef> = Vec::new();

    // ===== Everything else, line by line until `end_header` ================
    loop {
        let done = next_line(buf, |line| {
            let keyword = line.tokens.get(0).copied().unwrap_or("");

            // The format line has to be the first line after the magic
            // number.
            if format.is_none() && keyword != "format" {
                return Err(line.error("expected format line"));
            }

            match keyword {
                "comment" => comments.push(line.text_after_keyword("comment").to_string()),
                "obj_info" => obj_infos.push(line.text_after_keyword("obj_info").to_string()),

                // e.g. `format binary_little_endian 1.0`
                "format" => {
                    if format.is_some() {
                        return Err(line.error("duplicate format line"));
                    }

                    line.expect_tokens(3, "format")?;
                    let f = Format::from_header_token(line.tokens[1]).ok_or_else(|| {
                        line.error(format!(
                            "expected \"ascii\", \"binary_little_endian\" or \
                                \"binary_big_endian\", found {:?}",
                            line.tokens[1],
                        ))
                    })?;
                    if line.tokens[2] != "1.0" {
                        return Err(line.error(format!(
                            "unsupported PLY version {:?} (only 1.0 is supported)",
                            line.tokens[2],
                        )));
                    }

                    format = Some(f);
                }

                // e.g. `element vertex 8`
                "element" => {
                    line.expect_tokens(3, "element")?;
                    let count = line.tokens[2].parse::<u64>().map_err(|e| {
                        line.error(format!("invalid integer as element count ({})", e))
                    })?;

                    elements.push(ElementDef::new(line.tokens[1], count));
                }

                // e.g. `property float x` or `property list uchar int vertex_index`
                "property" => {
                    // The current element is always the last one.
                    let elem = elements.last_mut().ok_or_else(|| {
                        line.error("property definition without preceding element definition")
                    })?;

                    let def = if line.tokens.get(1) == Some(&"list") {
                        line.expect_tokens(5, "list property")?;

                        let len_type = parse_scalar_type(line, line.tokens[2])?;
                        let scalar_type = parse_scalar_type(line, line.tokens[3])?;

                        // Floating point or signed integer types for the
                        // length don't make a lot of sense.
                        let len_type = ListLenType::from_scalar_type(len_type).ok_or_else(|| {
                            line.error("only unsigned integers can be used to store list lengths")
                        })?;

                        PropertyDef::list(line.tokens[4], len_type, scalar_type)
                    } else {
                        line.expect_tokens(3, "property")?;
                        let ty = parse_scalar_type(line, line.tokens[1])?;

                        PropertyDef::scalar(line.tokens[2], ty)
                    };

                    if elem.prop_pos(&def.name).is_some() {
                        return Err(line.error(format!(
                            "duplicate property '{}' in element '{}'",
                            def.name,
                            elem.name,
                        )));
                    }

                    elem.property_defs.push(def);
                }

                "end_header" => {
                    line.expect_tokens(1, "end_header")?;
                    return Ok(true);
                }

                other => {
                    return Err(line.error(format!(
                        "expected line starting with \"comment\", \"obj_info\", \"element\", \
                            \"property\" or \"end_header\", found {:?}",
                        other,
                    )));
                }
            }

            Ok(false)
        })?;

        match done {
            Some(true) => break,
            Some(false) => {}
            None => return Err(unexpected_eof()),
        }
    }

    // The body starts right after the one terminator of the `end_header` line.
    buf.skip_one_linebreak()?;

    let format = format.ok_or_else(unexpected_eof)?;
    Ok(Header { format, comments, obj_infos, elements })
}


// ===========================================================================
// ===== Helpers for body parsing
// ===========================================================================

/// Helper trait to abstract the three different encodings.
trait EncodingReader {
    fn read_i8(buf: &mut impl Input) -> Result<i8, parse::Error>;
    fn read_u8(buf: &mut impl Input) -> Result<u8, parse::Error>;
    fn read_i16(buf: &mut impl Input) -> Result<i16, parse::Error>;
    fn read_u16(buf: &mut impl Input) -> Result<u16, parse::Error>;
    fn read_i32(buf: &mut impl Input) -> Result<i32, parse::Error>;
    fn read_u32(buf: &mut impl Input) -> Result<u32, parse::Error>;
    fn read_i64(buf: &mut impl Input) -> Result<i64, parse::Error>;
    fn read_u64(buf: &mut impl Input) -> Result<u64, parse::Error>;
    fn read_f32(buf: &mut impl Input) -> Result<f32, parse::Error>;
    fn read_f64(buf: &mut impl Input) -> Result<f64, parse::Error>;

    /// Starts reading one record. Only relevant for ASCII (where empty lines
    /// are skipped), therefore this empty implementation is provided.
    fn begin_element(_buf: &mut impl Input) -> Result<(), parse::Error> {
        Ok(())
    }

    /// Finishes reading one record. Only relevant for ASCII (where the rest of
    /// the line is skipped), therefore this empty implementation is provided.
    fn finish_element(_buf: &mut impl Input) -> Result<(), parse::Error> {
        Ok(())
    }

    /// Skips one record of an element without properties. Such records don't
    /// occupy any bytes in binary bodies.
    fn skip_empty_element(_buf: &mut impl Input) -> Result<(), parse::Error> {
        Ok(())
    }
}

/// Binary encoding with byte order `E`.
struct BinaryEncoding<E: ByteOrder>(PhantomData<E>);

macro_rules! binary_read {
    ($buf:ident, $size:expr, $read_fn:ident) => {{
        $buf.prepare($size)?;
        let v = E::$read_fn(&$buf[..$size]);
        $buf.consume($size);
        Ok(v)
    }};
}

impl<E: ByteOrder> EncodingReader for BinaryEncoding<E> {
    fn read_i8(buf: &mut impl Input) -> Result<i8, parse::Error> {
        Self::read_u8(buf).map(|b| b as i8)
    }
    fn read_u8(buf: &mut impl Input) -> Result<u8, parse::Error> {
        buf.prepare(1)?;
        let v = buf[0];
        buf.consume(1);
        Ok(v)
    }
    fn read_i16(buf: &mut impl Input) -> Result<i16, parse::Error> { binary_read!(buf, 2, read_i16) }
    fn read_u16(buf: &mut impl Input) -> Result<u16, parse::Error> { binary_read!(buf, 2, read_u16) }
    fn read_i32(buf: &mut impl Input) -> Result<i32, parse::Error> { binary_read!(buf, 4, read_i32) }
    fn read_u32(buf: &mut impl Input) -> Result<u32, parse::Error> { binary_read!(buf, 4, read_u32) }
    fn read_i64(buf: &mut impl Input) -> Result<i64, parse::Error> { binary_read!(buf, 8, read_i64) }
    fn read_u64(buf: &mut impl Input) -> Result<u64, parse::Error> { binary_read!(buf, 8, read_u64) }
    fn read_f32(buf: &mut impl Input) -> Result<f32, parse::Error> { binary_read!(buf, 4, read_f32) }
    fn read_f64(buf: &mut impl Input) -> Result<f64, parse::Error> { binary_read!(buf, 8, read_f64) }
}

fn is_value_separator(b: u8) -> bool {
    b == b' ' || b == b'\t'
}

/// Skips the separator in front of a value and makes sure that the value is
/// still on the current line.
fn ascii_value_start(buf: &mut impl Input) -> Result<(), parse::Error> {
    buf.skip_until(|b| !is_value_separator(b))?;
    if buf.is_eof()? || is_linebreak(buf[0]) {
        return Err(Span::single(buf.offset()).error("too few values in line"));
    }

    Ok(())
}

// Reads until the next whitespace or linebreak and tries to parse the string
// as `$ty`.
macro_rules! ascii_parser {
    ($buf:ident, $ty:ident) => {{
        ascii_value_start($buf)?;
        $buf.take_until(
            |b| is_value_separator(b) || is_linebreak(b),
            |sd| {
                let s = sd.assert_ascii()?;
                s.parse::<$ty>().map_err(|e| {
                    let msg = format!(
                        concat!("invalid '", stringify!($ty), "' literal {:?}: {}"),
                        s,
                        e,
                    );
                    sd.error(msg)
                })
            }
        )
    }}
}

/// ASCII encoding.
enum AsciiEncoding {}
impl EncodingReader for AsciiEncoding {
    fn read_i8(buf: &mut impl Input) -> Result<i8, parse::Error> { ascii_parser!(buf, i8) }
    fn read_u8(buf: &mut impl Input) -> Result<u8, parse::Error> { ascii_parser!(buf, u8) }
    fn read_i16(buf: &mut impl Input) -> Result<i16, parse::Error> { ascii_parser!(buf, i16) }
    fn read_u16(buf: &mut impl Input) -> Result<u16, parse::Error> { ascii_parser!(buf, u16) }
    fn read_i32(buf: &mut impl Input) -> Result<i32, parse::Error> { ascii_parser!(buf, i32) }
    fn read_u32(buf: &mut impl Input) -> Result<u32, parse::Error> { ascii_parser!(buf, u32) }
    fn read_i64(buf: &mut impl Input) -> Result<i64, parse::Error> { ascii_parser!(buf, i64) }
    fn read_u64(buf: &mut impl Input) -> Result<u64, parse::Error> { ascii_parser!(buf, u64) }
    fn read_f32(buf: &mut impl Input) -> Result<f32, parse::Error> { ascii_parser!(buf, f32) }
    fn read_f64(buf: &mut impl Input) -> Result<f64, parse::Error> { ascii_parser!(buf, f64) }

    fn begin_element(buf: &mut impl Input) -> Result<(), parse::Error> {
        // Skip empty (or whitespace only) lines.
        buf.skip_until(|b| !is_value_separator(b) && !is_linebreak(b))?;
        if buf.is_eof()? {
            return Err(parse::Error::UnexpectedEof(buf.offset()));
        }

        Ok(())
    }

    fn finish_element(buf: &mut impl Input) -> Result<(), parse::Error> {
        // Additional values at the end of the line are ignored.
        buf.skip_until(is_linebreak)
    }

    fn skip_empty_element(buf: &mut impl Input) -> Result<(), parse::Error> {
        // The record is one line, whatever it contains.
        buf.skip_until(is_linebreak)?;
        buf.skip_one_linebreak()
    }
}

/// Parses one record of an element with all its properties as described by
/// `def`. Properties are written into `out`. The type parameter `E` is used
/// to actually read values.
fn parse_element<E: EncodingReader, I: Input>(
    buf: &mut I,
    def: &ElementDef,
    record: u64,
    out: &mut Vec<Property>,
) -> Result<(), Error> {
    /// Reads a single value of type `ty` and returns it as `Property`. The
    /// returned `Property` is one of the scalar variants, i.e. not one of the
    /// `*List` variants!
    fn read_scalar<E: EncodingReader, I: Input>(
        buf: &mut I,
        ty: ScalarType,
    ) -> Result<Property, parse::Error> {
        let p = match ty {
            ScalarType::Char => Property::Char(E::read_i8(buf)?),
            ScalarType::UChar => Property::UChar(E::read_u8(buf)?),
            ScalarType::Short => Property::Short(E::read_i16(buf)?),
            ScalarType::UShort => Property::UShort(E::read_u16(buf)?),
            ScalarType::Int => Property::Int(E::read_i32(buf)?),
            ScalarType::UInt => Property::UInt(E::read_u32(buf)?),
            ScalarType::Long => Property::Long(E::read_i64(buf)?),
            ScalarType::ULong => Property::ULong(E::read_u64(buf)?),
            ScalarType::Float => Property::Float(E::read_f32(buf)?),
            ScalarType::Double => Property::Double(E::read_f64(buf)?),
        };

        Ok(p)
    }

    fn read_len<E: EncodingReader, I: Input>(
        buf: &mut I,
        ty: ListLenType,
    ) -> Result<u64, parse::Error> {
        let len: u64 = match ty {
            ListLenType::UChar => E::read_u8(buf)?.into(),
            ListLenType::UShort => E::read_u16(buf)?.into(),
            ListLenType::UInt => E::read_u32(buf)?.into(),
            ListLenType::ULong => E::read_u64(buf)?,
        };

        Ok(len)
    }

    fn read_property<E: EncodingReader, I: Input>(
        buf: &mut I,
        ty: PropertyType,
    ) -> Result<Property, parse::Error> {
        match ty {
            PropertyType::Scalar(ty) => read_scalar::<E, _>(buf, ty),
            PropertyType::List { len_type, scalar_type } => {
                let len = read_len::<E, _>(buf, len_type)?;

                // The list is not preallocated with `len`: a corrupt length
                // would otherwise make us allocate huge amounts of memory.
                macro_rules! read_list {
                    ($variant:ident, $read_fun:ident) => {{
                        let mut list = SmallVec::new();
                        for _ in 0..len {
                            list.push(E::$read_fun(buf)?);
                        }

                        Property::$variant(list)
                    }}
                }

                let p = match scalar_type {
                    ScalarType::Char => read_list!(CharList, read_i8),
                    ScalarType::UChar => read_list!(UCharList, read_u8),
                    ScalarType::Short => read_list!(ShortList, read_i16),
                    ScalarType::UShort => read_list!(UShortList, read_u16),
                    ScalarType::Int => read_list!(IntList, read_i32),
                    ScalarType::UInt => read_list!(UIntList, read_u32),
                    ScalarType::Long => read_list!(LongList, read_i64),
                    ScalarType::ULong => read_list!(ULongList, read_u64),
                    ScalarType::Float => read_list!(FloatList, read_f32),
                    ScalarType::Double => read_list!(DoubleList, read_f64),
                };

                Ok(p)
            }
        }
    }

    let record_context = RecordContext { def, record, prop: None };

    if def.property_defs.is_empty() {
        return E::skip_empty_element(buf).map_err(|e| Error::from_body(e, &record_context));
    }

    E::begin_element(buf).map_err(|e| Error::from_body(e, &record_context))?;

    for prop_def in def.property_defs.iter() {
        let property = read_property::<E, _>(buf, prop_def.ty).map_err(|e| {
            Error::from_body(e, RecordContext { prop: Some(prop_def), ..record_context })
        })?;
        out.push(property);
    }

    E::finish_element(buf).map_err(|e| Error::from_body(e, &record_context))?;

    Ok(())
}

/// Location inside the body, used for error messages.
#[derive(Clone, Copy)]
struct RecordContext<'a> {
    def: &'a ElementDef,
    record: u64,
    prop: Option<&'a PropertyDef>,
}

impl fmt::Display for RecordContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "element '{}', record {}", self.def.name, self.record)?;
        if let Some(prop) = self.prop {
            write!(f, ", property '{}' ({})", prop.name, prop.ty)?;
        }

        Ok(())
    }
}


// ===========================================================================
// ===== RawSink
// ===========================================================================

/// A type that can accept raw data from a PLY file. This is mainly used for
/// [`Reader::read_raw_into`].
pub trait RawSink {
    /// Is called when a new element group begins. `def` describes the layout
    /// of all records in this group. This method is *always* called before
    /// `element` is called.
    fn element_group_start(&mut self, def: &ElementDef);

    /// Is called for each record that is read. When called, the record
    /// belongs to the last element group (the last `element_group_start`
    /// call). The properties are in the order of the property definitions.
    fn element(&mut self, properties: &[Property]);
}

impl RawSink for Ply {
    fn element_group_start(&mut self, def: &ElementDef) {
        let mut element = Element::from_def(def.clone());
        element.rows.reserve(def.count.min(1 << 16) as usize);
        self.elements.push(element);
    }

    fn element(&mut self, properties: &[Property]) {
        if let Some(element) = self.elements.last_mut() {
            element.rows.push(Row::from(properties.to_vec()));
        }
    }
}
