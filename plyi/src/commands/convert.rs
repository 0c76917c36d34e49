use std::{
    fs::File,
    io::BufWriter,
    time::Instant,
};

use failure::{bail, Error, ResultExt};
use plyio::write::Config;

use crate::{
    args::{GlobalArgs, ConvertArgs},
    commands::load_file,
};


pub fn run(global_args: &GlobalArgs, args: &ConvertArgs) -> Result<(), Error> {
    let start_time = Instant::now();

    if args.target.exists() && !args.force {
        bail!(
            "target file '{}' already exists (use '--force' to overwrite it)",
            args.target.display(),
        );
    }

    let before_load = Instant::now();
    let ply = load_file(global_args, &args.source).context("could not read source file")?;
    let load_time = before_load.elapsed();

    info!("Target encoding: {}", args.encoding);

    let before_write = Instant::now();
    let file = File::create(&args.target)
        .context(format!("failed to create '{}'", args.target.display()))?;

    let config = ply.comments.iter().fold(
        Config::new(args.encoding).strict_endianness(global_args.strict_endianness),
        |config, c| config.add_comment(c.clone()),
    );
    let config = ply.obj_infos.iter().fold(config, |config, i| config.add_obj_info(i.clone()));

    let defs = ply.elements.iter().map(|e| e.def.clone()).collect::<Vec<_>>();
    let rows = ply.elements.iter().map(|e| &e.rows[..]).collect::<Vec<_>>();

    progress!(["Writing '{}'", args.target.display()] => {
        config.into_writer(BufWriter::new(file))
            .write(&defs, &rows)
            .context("could not write target file")?;
    });
    let write_time = before_write.elapsed();

    info!(
        "Processing time: {:.2?} ({:.2?} loading, {:.2?} writing)",
        start_time.elapsed(),
        load_time,
        write_time,
    );

    Ok(())
}
