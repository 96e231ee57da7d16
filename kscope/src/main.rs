use anyhow::{bail, Context, Result};
use console::style;
use inkwell::context::Context as LlvmContext;
use kscope_parser::lexer::Tokenizer;
use std::io::{self, Read};
use std::{env, fs, process};

fn read_input() -> Result<String> {
    let args: Vec<String> = env::args().skip(1).collect();
    match args.as_slice() {
        [] => {
            let mut input = String::new();
            io::stdin()
                .read_to_string(&mut input)
                .context("could not read stdin")?;
            Ok(input)
        }
        [path] => fs::read_to_string(path).with_context(|| format!("could not read {}", path)),
        _ => bail!("usage: kscope [FILE]"),
    }
}

fn run() -> Result<()> {
    let input = read_input()?;

    if env::var_os("KSCOPE_DUMP_TOKENS").is_some() {
        for token in Tokenizer::new(&input) {
            eprintln!("{:?}", token);
        }
    }
    let dump_ast = env::var_os("KSCOPE_DUMP_AST").is_some();

    let context = LlvmContext::create();
    let module = kscope::compile_with(&context, &input, |decl| {
        if dump_ast {
            eprintln!("{}", decl);
        }
    })?;
    print!("{}", module.print_to_string().to_string());
    Ok(())
}

fn main() {
    if let Err(err) = run() {
        eprintln!("{} {:#}", style("error:").red().bold(), err);
        process::exit(1);
    }
}
