mod models;
mod options;
