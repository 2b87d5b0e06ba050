mod tests_incremental;
mod tests_write_back;
