mod tests_correlation;
mod tests_positions;
