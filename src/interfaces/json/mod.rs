pub mod snapshot_writer;
