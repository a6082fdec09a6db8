pub mod statement_writer;
