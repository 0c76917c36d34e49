//! Defines `Args` which is used to parse command line arguments.

use std::path::PathBuf;

use structopt::StructOpt;
use plyio::Format;


#[derive(StructOpt, Debug)]
#[structopt(setting = structopt::clap::AppSettings::VersionlessSubcommands)]
pub struct Args {
    #[structopt(flatten)]
    pub global: GlobalArgs,

    #[structopt(subcommand)]
    pub command: Command,
}

#[derive(StructOpt, Debug)]
pub struct GlobalArgs {
    /// Reject binary files whose byte order differs from the one of this
    /// machine instead of byte-swapping them. Also applies to writing.
    #[structopt(long = "strict-endianness", global = true)]
    pub strict_endianness: bool,
}

#[derive(StructOpt, Debug)]
pub enum Command {
    /// Print information about a PLY file.
    #[structopt(name = "info")]
    Info {
        #[structopt(flatten)]
        args: InfoArgs,
    },

    /// Converts a PLY file from one encoding into another one.
    #[structopt(name = "convert")]
    Convert {
        #[structopt(flatten)]
        args: ConvertArgs,
    },

    /// Fits a plane through the positions of one element with the least
    /// squares method.
    #[structopt(name = "fit-plane")]
    FitPlane {
        #[structopt(flatten)]
        args: FitPlaneArgs,
    },
}

#[derive(StructOpt, Debug)]
pub struct InfoArgs {
    /// If specified, the body of the input file is read completely, even
    /// though the header already contains all information that is printed.
    /// This has the advantage that the file is completely inspected and any
    /// error is detected.
    #[structopt(long = "read-body")]
    pub read_body: bool,

    /// Path to the PLY file.
    #[structopt(parse(from_os_str))]
    pub file: PathBuf,
}

#[derive(StructOpt, Debug)]
pub struct ConvertArgs {
    /// Specify the target encoding. Valid values: 'binary' (native
    /// endianess), 'bbe' (binary big endian), 'ble' (binary little endian) and
    /// 'ascii'.
    #[structopt(
        short = "e",
        long = "encoding",
        default_value = "binary",
        parse(try_from_str = parse_encoding),
    )]
    pub encoding: Format,

    /// Overwrite the target file if it already exists.
    #[structopt(short = "f", long = "force")]
    pub force: bool,

    /// Path to the source PLY file.
    #[structopt(parse(from_os_str))]
    pub source: PathBuf,

    /// Path to the target PLY file. Files are not overwritten by default.
    #[structopt(parse(from_os_str))]
    pub target: PathBuf,
}

#[derive(StructOpt, Debug)]
pub struct FitPlaneArgs {
    /// Name of the element that holds the `x`, `y` and `z` properties.
    #[structopt(long = "element", default_value = "vertex")]
    pub element: String,

    /// Path to the PLY file.
    #[structopt(parse(from_os_str))]
    pub file: PathBuf,
}

fn parse_encoding(src: &str) -> Result<Format, String> {
    match src {
        "ascii" => Ok(Format::Ascii),
        "binary" => Ok(Format::binary_native()),
        "ble" => Ok(Format::BinaryLittleEndian),
        "bbe" => Ok(Format::BinaryBigEndian),
        other => Err(format!(
            "'{}' is not a valid encoding (valid: ascii, binary, ble, bbe)",
            other,
        )),
    }
}
