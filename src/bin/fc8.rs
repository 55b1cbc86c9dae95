use std::{
    fs,
    io::{self, Write},
    path::PathBuf,
};

use anyhow::{bail, Context};
use bpaf::{construct, positional, short, OptionParser, Parser};
use log::info;

use fc8_rs::{
    compress_blocks, compress_to_vec, decompress_blocks, decompress_to_vec, BLOCK_MAGIC,
};

#[derive(Debug, Clone)]
struct Args {
    decompress: bool,
    block_size: Option<u32>,
    input: PathBuf,
    output: Option<PathBuf>,
}

fn args_parser() -> OptionParser<Args> {
    let decompress = short('d')
        .long("decompress")
        .help("Decompress instead of compress")
        .switch();
    let block_size = short('b')
        .long("block-size")
        .help("Compress into independently decodable blocks of SIZE bytes (FC8b container)")
        .argument::<u32>("SIZE")
        .optional();
    let input = positional::<PathBuf>("INFILE").help("Input file");
    let output = positional::<PathBuf>("OUTFILE")
        .help("Output file (stdout if omitted)")
        .optional();

    construct!(Args {
        decompress,
        block_size,
        input,
        output,
    })
    .to_options()
    .descr("FC8 compression tool")
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = args_parser().run();

    let inp = fs::read(&args.input)
        .with_context(|| format!("reading \"{}\"", args.input.display()))?;

    let out = if args.decompress {
        if args.block_size.is_some() {
            bail!("--block-size only applies when compressing");
        }
        let out = if inp.len() >= 4 && inp[..4] == BLOCK_MAGIC {
            decompress_blocks(&inp)
        } else {
            decompress_to_vec(&inp)
        }
        .with_context(|| format!("decompressing \"{}\"", args.input.display()))?;
        info!("decompressed {} bytes to {} bytes", inp.len(), out.len());
        out
    } else {
        let out = match args.block_size {
            Some(block_size) => compress_blocks(&inp, block_size as usize),
            None => compress_to_vec(&inp),
        }
        .with_context(|| format!("compressing \"{}\"", args.input.display()))?;
        if inp.is_empty() {
            info!("compressed 0 bytes to {} bytes", out.len());
        } else {
            info!(
                "compressed {} bytes to {} bytes ({}% of the original)",
                inp.len(),
                out.len(),
                100 * out.len() / inp.len()
            );
        }
        out
    };

    match &args.output {
        Some(path) => fs::write(path, &out)
            .with_context(|| format!("writing \"{}\"", path.display()))?,
        None => io::stdout()
            .write_all(&out)
            .context("writing to stdout")?,
    }

    Ok(())
}
