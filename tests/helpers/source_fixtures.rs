//! LaTeX documents and code mapping batches shared by the integration tests.

use ilatex::CodeMapping;

pub const MAIN_FILE: &str = "thesis/main.tex";
pub const RESULTS_FILE: &str = "thesis/results.tex";

pub const MAIN: &str = r"\documentclass{report}
\begin{document}
\chapter{Introduction}
$$f(x) = \sum_{i=0}^{n} a_i x^i$$
\begin{figure}
  \includegraphics[width=\linewidth]{figures/overview.pdf}
\end{figure}
\input{results}
\end{document}
";

pub const RESULTS: &str = r"\chapter{Results}
\begin{tabular}{lrr}
  Run & Time & Error \\
  1 & 0.5 & 0.01 \\
  2 & 0.4 & 0.02
\end{tabular}
\begin{gridlayout}
  \begin{row}{3cm}
    \begin{cell}{0.5} \includegraphics{figures/a.png} \end{cell}
    \begin{cell}{0.5} \includegraphics{figures/b.png} \end{cell}
  \end{row}
\end{gridlayout}
\[ \epsilon < 0.05 \]
";

/// Mappings a build of `MAIN` and `RESULTS` would emit.
pub fn thesis_mappings() -> Vec<CodeMapping> {
    vec![
        CodeMapping::new("math", 1, MAIN_FILE, 4),
        CodeMapping::new("includegraphics", 2, MAIN_FILE, 6),
        CodeMapping::new("tabular", 1, RESULTS_FILE, 2),
        CodeMapping::new("gridlayout", 2, RESULTS_FILE, 7),
        CodeMapping::new("includegraphics", 3, RESULTS_FILE, 9),
        CodeMapping::new("includegraphics", 4, RESULTS_FILE, 10),
        CodeMapping::new("math", 5, RESULTS_FILE, 13),
    ]
}

/// Serialise mappings as a JSON-lines batch.
pub fn to_json_lines(mappings: &[CodeMapping]) -> String {
    mappings
        .iter()
        .map(|mapping| serde_json::to_string(mapping).unwrap() + "\n")
        .collect()
}
