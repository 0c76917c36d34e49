//! Reading and writing PLY files.
//!
//! PLY (polygon file format) is a self describing format for meshes and point
//! clouds: the header declares a list of *elements* (like `vertex` or
//! `face`), each with a number of records and an ordered list of typed
//! *properties*. The body stores all records, either as ASCII text or as
//! binary data with a fixed byte order.
//!
//! The easiest way to use this crate is via [`Ply`]:
//!
//! ```no_run
//! use plyio::{Format, Ply};
//!
//! # fn main() -> Result<(), plyio::Error> {
//! let mut ply = Ply::open("bunny.ply")?;
//! for element in &ply.elements {
//!     println!("{}: {} records", element.def.name, element.rows.len());
//! }
//!
//! ply.set_format(Format::BinaryLittleEndian);
//! ply.write_to_file("bunny_binary.ply")?;
//! # Ok(())
//! # }
//! ```
//!
//! For more control, use [`read::Reader`] (which parses the header up front
//! and lets you inspect it before the body is decoded) and
//! [`write::Config`]/[`write::Writer`].

use std::{
    fmt,
    io,
};

use failure::Fail;

pub use cgmath;


#[cfg(test)]
#[macro_use]
mod test_utils;

mod document;
mod parse;

pub mod math;
pub mod raw;
pub mod read;
pub mod write;

#[cfg(test)]
mod tests;


pub use self::{
    document::{Element, Ply},
    read::{ReadOptions, Reader},
    write::{Config, Writer},
};


/// Reads a whole PLY file (header and body) from the given reader.
///
/// This is a shorthand for [`Ply::read`].
pub fn parse(reader: impl io::Read) -> Result<Ply, Error> {
    Ply::read(reader)
}

/// Writes the given document into the given writer, using the document's
/// format.
///
/// This is a shorthand for [`Ply::write_to`].
pub fn serialize(ply: &Ply, writer: impl io::Write) -> Result<(), Error> {
    ply.write_to(writer)
}


/// The encoding of the body of a PLY file. The header is always ASCII.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Format {
    Ascii,
    BinaryLittleEndian,
    BinaryBigEndian,
}

impl Format {
    /// Returns the binary format with the native endianness of the host.
    pub fn binary_native() -> Self {
        #[cfg(target_endian = "big")]
        { Format::BinaryBigEndian }

        #[cfg(target_endian = "little")]
        { Format::BinaryLittleEndian }
    }

    pub fn is_binary(&self) -> bool {
        *self != Format::Ascii
    }

    /// The token used in the `format` line of the header.
    pub fn header_token(&self) -> &'static str {
        match self {
            Format::Ascii => "ascii",
            Format::BinaryLittleEndian => "binary_little_endian",
            Format::BinaryBigEndian => "binary_big_endian",
        }
    }

    pub(crate) fn from_header_token(token: &str) -> Option<Self> {
        match token {
            "ascii" => Some(Format::Ascii),
            "binary_little_endian" => Some(Format::BinaryLittleEndian),
            "binary_big_endian" => Some(Format::BinaryBigEndian),
            _ => None,
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.header_token().fmt(f)
    }
}


/// Everything that can go wrong when reading or writing PLY files.
#[derive(Debug, Fail)]
pub enum Error {
    /// The header is malformed or the document can't be written because of
    /// its structure (undefined format, wrong number of rows).
    #[fail(display = "invalid PLY header or structure: {}", _0)]
    Format(String),

    /// Only returned in strict mode: the file's byte order differs from the
    /// byte order of this machine.
    #[fail(
        display = "file is {}, but this machine is {} (strict endianness mode)",
        declared,
        host
    )]
    EndiannessMismatch {
        declared: Format,
        host: Format,
    },

    /// The body contains a value that couldn't be decoded or a value doesn't
    /// fit the property it is written to.
    #[fail(display = "invalid PLY data: {}", _0)]
    Data(String),

    #[fail(display = "IO error: {}", _0)]
    Io(#[cause] io::Error),
}

impl Error {
    /// Classifies an error from the parse buffer that occured while reading
    /// the header.
    pub(crate) fn from_header(e: parse::Error) -> Self {
        match e {
            parse::Error::Io(e) => Error::Io(e),
            parse::Error::UnexpectedEof(_) => {
                Error::Format("unexpected end of file before \"end_header\"".into())
            }
            other => Error::Format(other.to_string()),
        }
    }

    /// Classifies an error from the parse buffer that occured while reading
    /// the body. `context` names the location (element and record).
    pub(crate) fn from_body(e: parse::Error, context: impl fmt::Display) -> Self {
        match e {
            parse::Error::Io(ref io_err) if io_err.kind() == io::ErrorKind::UnexpectedEof => {
                Error::Data(format!("{}: unexpected end of file", context))
            }
            parse::Error::Io(e) => Error::Io(e),
            other => Error::Data(format!("{}: {}", context, other)),
        }
    }
}

impl From<io::Error> for Error {
    fn from(src: io::Error) -> Self {
        Error::Io(src)
    }
}
