use anyhow::Result;
use pretty_assertions::assert_eq;

#[test]
fn round_trip_sorts() -> Result<()> {
	let input = include_str!("round_trip_input.tiny");
	let expected = include_str!("round_trip_output.tiny");

	let mappings = warp::tiny_v2::read(input.as_bytes())?;

	let actual = warp::tiny_v2::write_string(&mappings)?;

	assert_eq!(actual, expected, "left: actual, right: expected");

	Ok(())
}

#[test]
fn switch_source() -> Result<()> {
	let input = include_str!("round_trip_input.tiny");
	let expected = include_str!("switch_source_output.tiny");

	let mappings = warp::tiny_v2::read(input.as_bytes())?;

	let switched = mappings.switch_source("intermediary")?;
	let actual = warp::tiny_v2::write_string(&switched)?;

	assert_eq!(actual, expected, "left: actual, right: expected");

	// switching back restores the original, apart from sorting
	let back = switched.switch_source("official")?;
	assert_eq!(back, mappings);

	Ok(())
}
