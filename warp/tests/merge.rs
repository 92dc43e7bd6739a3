use anyhow::Result;
use pretty_assertions::assert_eq;

#[test]
fn later_tree_wins() -> Result<()> {
	let a = include_str!("merge_a_input.tiny");
	let b = include_str!("merge_b_input.tiny");
	let expected = include_str!("merge_output.tiny");

	let mut mappings = warp::tiny_v2::read(a.as_bytes())?;
	let other = warp::tiny_v2::read(b.as_bytes())?;

	mappings.merge_from(&other)?;

	let actual = warp::tiny_v2::write_string(&mappings)?;

	assert_eq!(actual, expected, "left: actual, right: expected");

	Ok(())
}

#[test]
fn merging_different_sources_fails() -> Result<()> {
	let a = include_str!("merge_a_input.tiny");

	let mut mappings = warp::tiny_v2::read(a.as_bytes())?;
	let other = warp::tiny_v2::read("tiny	2	0	official	named\nc	a	pkg/Foo\n".as_bytes())?;

	assert!(mappings.merge_from(&other).is_err());

	Ok(())
}
