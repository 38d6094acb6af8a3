pub mod cmd;
pub mod csv_parse;
pub mod evaluate;
pub mod hist_plot;
pub mod split;
pub mod stats;
pub mod table;
