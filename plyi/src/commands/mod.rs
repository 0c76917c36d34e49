use std::{
    fs::File,
    path::Path,
};

use failure::{Error, ResultExt};
use plyio::{Ply, ReadOptions, Reader};

use crate::args::GlobalArgs;


pub mod convert;
pub mod fit_plane;
pub mod info;


fn read_options(global_args: &GlobalArgs) -> ReadOptions {
    ReadOptions {
        strict_endianness: global_args.strict_endianness,
    }
}

/// Opens the given file and parses its PLY header.
fn open_reader(global_args: &GlobalArgs, path: &Path) -> Result<Reader<File>, Error> {
    let file = File::open(path)
        .context(format!("failed to open file '{}'", path.display()))?;
    let reader = Reader::with_options(file, read_options(global_args))
        .context(format!("failed to read PLY header of '{}'", path.display()))?;

    Ok(reader)
}

/// Reads the complete file into a `Ply` document.
fn load_file(global_args: &GlobalArgs, path: &Path) -> Result<Ply, Error> {
    let reader = open_reader(global_args, path)?;
    info!(
        "Source encoding: {} ({} element group(s))",
        reader.format(),
        reader.elements().len(),
    );

    let ply = progress!(["Reading '{}'", path.display()] => {
        reader.read_body()
            .context(format!("failed to read PLY body of '{}'", path.display()))?
    });

    Ok(ply)
}
