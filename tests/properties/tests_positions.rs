//! Ordering, shift composition and edit mapping over generated inputs.

use ilatex::base::{Shift, SourceFilePosition, SourceFileRange, TextEdit, compare};
use ilatex::SourceFile;
use rstest::rstest;

use crate::helpers::source_fixtures::{RESULTS, RESULTS_FILE};

fn shifts() -> Vec<Shift> {
    let mut out = Vec::new();
    for lines in [-2, 0, 1, 3] {
        for columns in [-4, 0, 2, 7] {
            out.push(Shift::new(lines, columns));
        }
    }
    out
}

fn positions() -> Vec<SourceFilePosition> {
    let mut out = Vec::new();
    for line in [0, 1, 5] {
        for column in [0, 3, 9] {
            let position = SourceFilePosition::new(line, column);
            out.push(position);
            out.push(position.shifted_by(Shift::new(1, -2)));
            out.push(position.shifted_by(Shift::columns(4)));
        }
    }
    out
}

#[test]
fn test_shift_composition_is_associative() {
    let shifts = shifts();
    for a in &shifts {
        for b in &shifts {
            for c in &shifts {
                assert_eq!(a.then(*b).then(*c), a.then(b.then(*c)), "{a:?} {b:?} {c:?}");
            }
        }
    }
}

#[test]
fn test_shifting_twice_equals_shifting_by_composition() {
    let start = SourceFilePosition::new(6, 6);
    for a in shifts() {
        for b in shifts() {
            let twice = start.shifted_by(a).shifted_by(b);
            let once = start.shifted_by(a.then(b));
            assert_eq!((twice.line(), twice.column()), (once.line(), once.column()));
        }
    }
}

#[test]
fn test_position_order_is_total() {
    let positions = positions();
    for a in &positions {
        for b in &positions {
            // Exactly one of <, ==, > holds, and the order is antisymmetric
            let holds = [a < b, a == b, a > b].iter().filter(|held| **held).count();
            assert_eq!(holds, 1);
            assert_eq!(compare(a, b), compare(b, a).reverse());
            for c in &positions {
                if a <= b && b <= c {
                    assert!(a <= c);
                }
            }
        }
    }
}

#[rstest]
#[case::insert_line(SourceFileRange::from_coords(2, 0, 2, 0), "  x & y \\\\\n")]
#[case::delete_rows(SourceFileRange::from_coords(3, 2, 4, 16), "")]
#[case::replace_inline(SourceFileRange::from_coords(1, 15, 1, 20), "{ccc}")]
#[case::join_lines(SourceFileRange::from_coords(5, 13, 6, 0), " ")]
#[case::split_line(SourceFileRange::from_coords(12, 3, 12, 3), "\n\n")]
fn test_edits_keep_ranges_ordered(#[case] range: SourceFileRange, #[case] new_text: &str) {
    let mut file = SourceFile::parse(RESULTS_FILE, RESULTS).unwrap();
    let before: Vec<_> = file
        .ast()
        .descendants(file.ast().root_id())
        .into_iter()
        .filter_map(|id| file.ast().get(id).map(|node| (id, node.range())))
        .collect();

    let edit = TextEdit::new(range, new_text);
    file.apply_edit(&edit).unwrap();

    for (id, old) in before {
        let new = file.ast().get(id).unwrap().range();
        assert!(new.from() <= new.to(), "{id} became {new}");
        if old.to() < range.from() {
            assert_eq!(new, old, "{id} ends before the edit and must not move");
            assert_eq!(new.from().line(), old.from().line());
            assert_eq!(new.from().column(), old.from().column());
        }
    }
}
