use std::io::{self, Write};
use std::process;

use log::error;

use leafbase::pager::PagerProxy;
use leafbase::statement::Statement;
use leafbase::table::Table;

fn main() {
    env_logger::init();

    let filename = match std::env::args().nth(1) {
        Some(filename) => filename,
        None => {
            println!("Must supply a database filename.");
            process::exit(1);
        }
    };

    let mut table = match Table::db_open(&filename) {
        Ok(table) => table,
        Err(err) => {
            error!("failed to open {filename}: {err}");
            println!("Unable to open database file.");
            process::exit(1);
        }
    };

    let stdin = io::stdin();
    let mut line = String::new();

    loop {
        print!("db > ");
        if io::stdout().flush().is_err() {
            process::exit(1);
        }

        line.clear();
        let bytes_read = match stdin.read_line(&mut line) {
            Ok(n) => n,
            Err(err) => {
                error!("failed to read a line: {err}");
                println!("Could not read a line. Exiting.");
                process::exit(1);
            }
        };

        if bytes_read == 0 {
            println!("Could not read a line. Exiting.");
            process::exit(1);
        }

        let line_text = line.trim_end_matches('\n').trim_end_matches('\r');

        if let Some(command) = line_text.strip_prefix('.') {
            run_meta_command(command, &mut table, line_text);
            continue;
        }

        let statement = match Statement::prepare_statement(line_text) {
            Ok(statement) => statement,
            Err(err) => {
                println!("{}", err.message(line_text));
                continue;
            }
        };

        match statement.execute(&mut table) {
            Ok(rows) => {
                for row in rows {
                    println!("{row}");
                }
                println!("Executed.");
            }
            Err(leafbase::cursor::ExecuteError::TableFull) => {
                println!("Cannot insert new data. Table is full.");
            }
            Err(err) => {
                error!("fatal execution error: {err}");
                println!("A fatal error occurred while executing the query.");
                process::exit(1);
            }
        }
    }
}

fn run_meta_command(command: &str, table: &mut Table, full_line: &str) {
    match command {
        "exit" => {
            if let Err(err) = table.db_close() {
                error!("failed to close database cleanly: {err}");
                println!("Could not close a file descriptor. Exiting.");
                process::exit(1);
            }
            process::exit(0);
        }
        "btree" => {
            println!("Tree:");
            print!("{}", PagerProxy::new(&mut table.pager));
        }
        _ => println!("Unkown command: {full_line}"),
    }
}
