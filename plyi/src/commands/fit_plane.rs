use failure::{format_err, Error, ResultExt};
use plyio::math;

use crate::{
    args::{GlobalArgs, FitPlaneArgs},
    commands::load_file,
    ui,
};


pub fn run(global_args: &GlobalArgs, args: &FitPlaneArgs) -> Result<(), Error> {
    let ply = load_file(global_args, &args.file)?;

    let element = ply.element(&args.element).ok_or_else(|| {
        format_err!("the file has no element '{}'", args.element)
    })?;
    let points = element.positions().ok_or_else(|| {
        format_err!(
            "element '{}' doesn't have scalar 'x', 'y' and 'z' properties",
            args.element,
        )
    })?;

    info!(
        "Fitting plane through {} points",
        ui::fmt_with_thousand_sep(points.len() as u64),
    );
    let plane = math::fit_plane(&points).context("failed to fit a plane")?;

    let distances = points.iter().map(|&p| math::distance(p, &plane)).collect::<Vec<_>>();
    let max = distances.iter().cloned().fold(0.0, f64::max);
    let mean = distances.iter().sum::<f64>() / distances.len() as f64;

    println!();
    println!("plane: {}*x + {}*y + {}*z + {} = 0", plane[0], plane[1], plane[2], plane[3]);
    println!("max distance:  {}", max);
    println!("mean distance: {}", mean);

    Ok(())
}
