use std::fs::File;

use failure::{Error, ResultExt};
use plyio::{Reader, raw::ElementDef};
use term_painter::{Color, ToStyle};

use crate::{
    args::{GlobalArgs, InfoArgs},
    commands::open_reader,
    ui,
};


pub fn run(global_args: &GlobalArgs, args: &InfoArgs) -> Result<(), Error> {
    let reader = open_reader(global_args, &args.file)?;
    print_header(&reader);

    if args.read_body {
        let path = args.file.display();
        let ply = progress!(["Reading body of '{}'", path] => {
            reader.read_body().context(format!("failed to read PLY body of '{}'", path))?
        });

        let records: usize = ply.elements.iter().map(|e| e.rows.len()).sum();
        info!(
            "The body is valid and contains {} records",
            ui::fmt_with_thousand_sep(records as u64),
        );
    }

    Ok(())
}

/// Pretty prints everything we know from the header.
fn print_header(reader: &Reader<File>) {
    println!(
        "Encoding: {}",
        Color::BrightWhite.bold().paint(reader.format()),
    );

    for comment in reader.comments() {
        println!("{} {}", Color::BrightBlack.paint("comment:"), comment);
    }
    for obj_info in reader.obj_infos() {
        println!("{} {}", Color::BrightBlack.paint("obj_info:"), obj_info);
    }
    println!();

    if reader.elements().is_empty() {
        println!("{}", Color::BrightBlack.paint("(no elements)"));
    }

    for def in reader.elements() {
        print_element(def);
    }
}

fn print_element(def: &ElementDef) {
    let kind = match def.kind() {
        Some(kind) => format!(" [{:?}]", kind).to_lowercase(),
        None => String::new(),
    };

    println!(
        "{}{} × {}",
        Color::BrightWhite.bold().paint(&def.name),
        Color::BrightBlack.paint(kind),
        ui::fmt_with_thousand_sep(def.count),
    );

    let name_width = def.property_defs.iter().map(|p| p.name.len()).max().unwrap_or(0);
    for (i, prop) in def.property_defs.iter().enumerate() {
        let branch = if i == def.property_defs.len() - 1 { "└" } else { "├" };
        println!(
            "  {} {:<width$}  {}",
            Color::BrightBlack.paint(branch),
            prop.name,
            Color::Cyan.paint(&prop.ty),
            width = name_width,
        );
    }
}
