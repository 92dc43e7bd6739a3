use std::path::PathBuf;
use anyhow::{anyhow, Result};
use indexmap::IndexMap;
use pretty_assertions::assert_eq;
use shuttle::jar::MemJar;
use treadle::bundle;
use treadle::layer::unpick::{UnpickData, UnpickMetadata};

fn scratch_path(name: &str) -> PathBuf {
	std::env::temp_dir().join(format!("treadle-bundle-test-{}-{name}", std::process::id()))
}

#[test]
fn bundle_holds_the_reprojected_mappings_and_extras() -> Result<()> {
	let input = "\
tiny	2	0	named	official	intermediary
c	pkg/FooBar	a	net/minecraft/class_1
	m	()V	doThing	a	method_1
	m	()V	<init>
";
	let tree = warp::tiny_v2::read(input.as_bytes())?;

	let mut fixes = IndexMap::new();
	fixes.insert("net/minecraft/class_1".to_owned(), "<T:Ljava/lang/Object;>Ljava/lang/Record;".to_owned());

	let unpick = UnpickData {
		definitions: b"v2\nunpick stuff\n".to_vec(),
		metadata: UnpickMetadata {
			version: 1,
			unpick_group: "net.fabricmc.unpick".to_owned(),
			unpick_version: "2.3.0".to_owned(),
		},
	};

	let path = scratch_path("full.jar");
	bundle::write_bundle(&tree, Some(&fixes), Some(&unpick), &path)?;

	let jar = MemJar::from_path(&path)?;

	// intermediary-keyed, named as the only column, constructor completed
	let expected = "\
tiny	2	0	intermediary	named
c	net/minecraft/class_1	pkg/FooBar
	m	()V	<init>	<init>
	m	()V	method_1	doThing
";
	let mappings = jar.entry("mappings/mappings.tiny")
		.ok_or_else(|| anyhow!("no mappings entry"))?;
	assert_eq!(String::from_utf8(mappings.to_vec())?, expected);

	let stored_fixes: IndexMap<String, String> = serde_json::from_slice(
		jar.entry("extras/record_signatures.json").ok_or_else(|| anyhow!("no signature fixes entry"))?,
	)?;
	assert_eq!(stored_fixes, fixes);

	assert_eq!(jar.entry("extras/definitions.unpick"), Some(&unpick.definitions[..]));
	let stored_metadata: UnpickMetadata = serde_json::from_slice(
		jar.entry("extras/unpick.json").ok_or_else(|| anyhow!("no unpick metadata entry"))?,
	)?;
	assert_eq!(stored_metadata, unpick.metadata);

	std::fs::remove_file(&path)?;
	Ok(())
}

#[test]
fn extras_are_omitted_when_no_layer_contributed_them() -> Result<()> {
	let input = "\
tiny	2	0	named	intermediary
c	pkg/FooBar	net/minecraft/class_1
";
	let tree = warp::tiny_v2::read(input.as_bytes())?;

	let path = scratch_path("bare.jar");
	bundle::write_bundle(&tree, None, None, &path)?;

	let jar = MemJar::from_path(&path)?;
	assert!(jar.entry("mappings/mappings.tiny").is_some());
	assert!(jar.entry("extras/record_signatures.json").is_none());
	assert!(jar.entry("extras/definitions.unpick").is_none());

	std::fs::remove_file(&path)?;
	Ok(())
}

#[test]
fn a_failed_write_leaves_no_output_behind() -> Result<()> {
	// no intermediary namespace, so the reprojection must fail
	let input = "\
tiny	2	0	named	official
c	pkg/FooBar	a
";
	let tree = warp::tiny_v2::read(input.as_bytes())?;

	let path = scratch_path("failed.jar");
	std::fs::write(&path, b"stale leftover")?;

	assert!(bundle::write_bundle(&tree, None, None, &path).is_err());
	assert!(!path.exists());
	Ok(())
}
