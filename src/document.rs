use std::{
    fs::File,
    io::{self, BufWriter},
    path::Path,
};

use cgmath::Point3;

use crate::{
    Error, Format,
    raw::{ElementDef, PropIndex, Property, PropertyDef, Row},
    read::{ReadOptions, Reader},
    write::Config,
};


/// A complete PLY file in memory: the format, the header comments and all
/// elements with their data.
///
/// A document is either the result of reading a file ([`Ply::read`],
/// [`Ply::open`]) or built programmatically and then written.
///
/// ```
/// use plyio::{Format, Ply, Element, raw::{PropertyDef, ScalarType, Row}};
///
/// let mut vertex = Element::new("vertex", 1);
/// vertex.add_property(PropertyDef::scalar("x", ScalarType::Float));
/// vertex.add_property(PropertyDef::scalar("y", ScalarType::Float));
/// let mut row = Row::new();
/// row.push(1.0f32);
/// row.push(2.5f32);
/// vertex.push_row(row);
///
/// let mut ply = Ply::new();
/// ply.set_format(Format::Ascii);
/// ply.add_element(vertex);
///
/// let out = ply.write_to_memory().unwrap();
/// assert!(out.ends_with(b"end_header\n1 2.5\n"));
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Ply {
    /// The body encoding. Writing fails while this is `None`.
    pub format: Option<Format>,

    /// Text of all `comment` lines, in order of appearance.
    pub comments: Vec<String>,

    /// Text of all `obj_info` lines, in order of appearance.
    pub obj_infos: Vec<String>,

    pub elements: Vec<Element>,
}

/// One element of a PLY file: its definition and its records.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub def: ElementDef,
    pub rows: Vec<Row>,
}

impl Ply {
    /// Creates an empty document without format.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads a complete PLY file from the given reader.
    pub fn read(reader: impl io::Read) -> Result<Self, Error> {
        Self::read_with(reader, ReadOptions::default())
    }

    pub fn read_with(reader: impl io::Read, options: ReadOptions) -> Result<Self, Error> {
        Reader::with_options(reader, options)?.read_body()
    }

    /// Opens and reads the file at the given path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, Error> {
        Reader::open(path)?.read_body()
    }

    pub fn set_format(&mut self, format: Format) {
        self.format = Some(format);
    }

    /// Appends an element. Elements are written in the order they were added.
    pub fn add_element(&mut self, element: Element) {
        self.elements.push(element);
    }

    /// Adds a `comment` line to the header. Writing fails if the comment
    /// contains a line break.
    pub fn add_comment(&mut self, comment: impl Into<String>) {
        self.comments.push(comment.into());
    }

    /// Adds an `obj_info` line to the header. Like comments, it must not
    /// contain a line break.
    pub fn add_obj_info(&mut self, info: impl Into<String>) {
        self.obj_infos.push(info.into());
    }

    /// Returns the element with the given name, if any.
    pub fn element(&self, name: &str) -> Option<&Element> {
        self.elements.iter().find(|e| e.def.name == name)
    }

    /// Writes this document into the given writer.
    pub fn write_to(&self, writer: impl io::Write) -> Result<(), Error> {
        let format = self.format.ok_or_else(|| {
            Error::Format("format of the document is undefined".into())
        })?;

        let mut config = Config::new(format);
        for comment in &self.comments {
            config = config.add_comment(comment.as_str());
        }
        for info in &self.obj_infos {
            config = config.add_obj_info(info.as_str());
        }

        let defs = self.elements.iter().map(|e| e.def.clone()).collect::<Vec<_>>();
        let rows = self.elements.iter().map(|e| e.rows.as_slice()).collect::<Vec<_>>();
        config.into_writer(writer).write(&defs, &rows)
    }

    /// Creates the file at the given path (truncating it if it exists) and
    /// writes this document into it.
    pub fn write_to_file(&self, path: impl AsRef<Path>) -> Result<(), Error> {
        let file = File::create(path)?;
        self.write_to(BufWriter::new(file))
    }

    /// Writes this document into a new `Vec<u8>`.
    pub fn write_to_memory(&self) -> Result<Vec<u8>, Error> {
        let mut out = Vec::new();
        self.write_to(&mut out)?;
        Ok(out)
    }
}

impl Element {
    /// Creates an element without properties and rows. `count` is the number
    /// of records declared in the header; writing fails unless exactly that
    /// many rows were pushed.
    pub fn new(name: impl Into<String>, count: u64) -> Self {
        Self::from_def(ElementDef::new(name, count))
    }

    pub(crate) fn from_def(def: ElementDef) -> Self {
        Self {
            def,
            rows: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.def.name
    }

    /// Appends a property definition. Properties are stored and written in
    /// the order they were added.
    pub fn add_property(&mut self, def: PropertyDef) {
        self.def.property_defs.push(def);
    }

    /// Appends a record. Its values are in the order of the property
    /// definitions.
    pub fn push_row(&mut self, row: Row) {
        self.rows.push(row);
    }

    /// Returns the value of the property `prop` of the record with index
    /// `row`.
    pub fn get(&self, row: usize, prop: &str) -> Option<&Property> {
        let idx = self.def.prop_pos(prop)?;
        self.rows.get(row)?.get(idx)
    }

    /// Collects the `x`, `y` and `z` properties of all records as points.
    ///
    /// Returns `None` if one of those properties is missing or is a list. The
    /// properties can have any numeric type.
    pub fn positions(&self) -> Option<Vec<Point3<f64>>> {
        let idx = |name: &str| -> Option<PropIndex> {
            let idx = self.def.prop_pos(name)?;
            if self.def.property_defs[idx].ty.is_list() {
                None
            } else {
                Some(idx)
            }
        };
        let (x, y, z) = (idx("x")?, idx("y")?, idx("z")?);

        self.rows.iter()
            .map(|row| {
                Some(Point3::new(
                    row.get(x)?.to_f64()?,
                    row.get(y)?.to_f64()?,
                    row.get(z)?.to_f64()?,
                ))
            })
            .collect()
    }
}
