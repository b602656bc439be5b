//! Collecting and pruning through the public syntax API.

use vgoroot_lib::goroot::SymbolFilter;
use vgoroot_lib::syntax::parse_file;

const VANILLA: &str = "package strings

// Index returns the index.
func Index(s, sep string) int { return 0 }

func (b *Builder) Len() int { return 0 }

type Builder struct{}

const (
\tMaxLen = 10
\tMinLen = 0
)
";

const OVERLAY: &str = "package strings

func Index(s, sep string) int { return -1 }

const MaxLen = 20
";

const PRUNED: &str = "package strings

func (b *Builder) Len() int { return 0 }

type Builder struct{}

const (
\t_ = 10
\tMinLen = 0
)
";

#[test]
fn overlay_declarations_are_removed_from_vanilla() {
  let mut filter = SymbolFilter::new();
  let mut overlay = parse_file("overlay.go", OVERLAY).unwrap();
  assert!(!filter.collect(&mut overlay));
  assert!(filter.contains("Index"));
  assert!(filter.contains("MaxLen"));
  assert_eq!(filter.len(), 2);

  let mut vanilla = parse_file("strings.go", VANILLA).unwrap();
  assert!(filter.prune(&mut vanilla));
  assert_eq!(vanilla.render(), PRUNED);
}

#[test]
fn methods_are_matched_by_receiver_type() {
  let filter: SymbolFilter = ["Builder.Len"].into_iter().collect();
  let mut vanilla = parse_file("strings.go", VANILLA).unwrap();

  assert!(filter.prune(&mut vanilla));
  let out = vanilla.render();
  assert!(!out.contains("Len()"));
  assert!(out.contains("func Index"));
  assert!(out.contains("type Builder struct{}"));
}

#[test]
fn unrelated_filter_leaves_source_byte_identical() {
  let filter: SymbolFilter = ["Other", "T.M"].into_iter().collect();
  let mut vanilla = parse_file("strings.go", VANILLA).unwrap();

  assert!(!filter.prune(&mut vanilla));
  assert!(!vanilla.is_modified());
  assert_eq!(vanilla.render(), VANILLA);
}

#[test]
fn syntax_errors_carry_the_file_name() {
  let err = parse_file("broken.go", "package p\n\nfunc (\n").unwrap_err();
  assert_eq!(err.file, "broken.go");
  assert!(err.to_string().starts_with("broken.go:"));
}

#[test]
fn byte_order_mark_survives_pruning() {
  let filter: SymbolFilter = ["Index"].into_iter().collect();
  let src = format!("\u{feff}{VANILLA}");
  let mut vanilla = parse_file("strings.go", &src).unwrap();

  assert!(filter.prune(&mut vanilla));
  assert!(vanilla.render().starts_with("\u{feff}package strings\n"));
  assert!(!vanilla.render().contains("func Index"));
}
