use anyhow::{anyhow, Result};
use pretty_assertions::assert_eq;
use treadle::layer::{MappingLayer, MappingsNamespace};
use treadle::layer::file_based::FileBasedLayer;
use treadle::layer::intermediary::IntermediaryLayer;
use treadle::layer::mojmap::OfficialMojangLayer;
use treadle::layer::parchment::{ParchmentLayer, ParchmentTreeV1};
use treadle::layer::unpick::{UnpickData, UnpickLayer, UnpickMetadata};
use treadle::processor::LayeredMappingsProcessor;
use treadle::spec::LayeredMappingSpec;

fn processor() -> LayeredMappingsProcessor {
	LayeredMappingsProcessor::new(LayeredMappingSpec::builder().build(), false)
}

fn intermediary_layer() -> Result<MappingLayer> {
	let tree = warp::tiny_v2::read(include_str!("intermediary_input.tiny").as_bytes())?;
	Ok(MappingLayer::Intermediary(IntermediaryLayer::new(tree)))
}

fn mojang_layer() -> Result<MappingLayer> {
	let named = MappingsNamespace::Named.as_str();
	let official = MappingsNamespace::Official.as_str();
	let client = warp::proguard::read(include_str!("mojang_client_input.txt").as_bytes(), named, official)?;
	let server = warp::proguard::read(include_str!("mojang_server_input.txt").as_bytes(), named, official)?;
	Ok(MappingLayer::OfficialMojang(OfficialMojangLayer::new(client, server)))
}

fn file_layer(tiny: &str) -> Result<MappingLayer> {
	let tree = warp::tiny_v2::read(tiny.as_bytes())?;
	Ok(MappingLayer::FileBased(FileBasedLayer::new(tree, MappingsNamespace::Intermediary, None)?))
}

fn unpick_layer(group: &str) -> MappingLayer {
	MappingLayer::Unpick(UnpickLayer::new(UnpickData {
		definitions: b"v2".to_vec(),
		metadata: UnpickMetadata {
			version: 1,
			unpick_group: group.to_owned(),
			unpick_version: "2.3.0".to_owned(),
		},
	}))
}

#[test]
fn mojang_names_end_to_end() -> Result<()> {
	let layers = vec![intermediary_layer()?, mojang_layer()?];
	let tree = processor().get_mappings(&layers)?;

	assert_eq!(tree.src_namespace(), Some("named"));
	let official = tree.namespace("official")?;
	let intermediary = tree.namespace("intermediary")?;

	let class = tree.get_class("pkg/FooBar")
		.ok_or_else(|| anyhow!("class pkg/FooBar is missing"))?;
	assert_eq!(class.dst.get(official), Some("a"));
	assert_eq!(class.dst.get(intermediary), Some("net/minecraft/class_1"));

	let method = class.get_method("doThing", "()V")
		.ok_or_else(|| anyhow!("method doThing is missing"))?;
	assert_eq!(method.dst.get(official), Some("a"));
	assert_eq!(method.dst.get(intermediary), Some("method_1"));

	let field = class.get_field("someField", "I")
		.ok_or_else(|| anyhow!("field someField is missing"))?;
	assert_eq!(field.dst.get(official), Some("a"));

	// the client-only class came along too
	assert!(tree.get_class("pkg/ClientThing").is_some());

	// and the result survives a tiny round trip
	let written = warp::tiny_v2::write_string(&tree)?;
	let back = warp::tiny_v2::read(written.as_bytes())?;
	assert_eq!(back, tree);
	Ok(())
}

#[test]
fn repeated_runs_are_byte_identical() -> Result<()> {
	let layers = vec![intermediary_layer()?, mojang_layer()?];
	let processor = processor();

	let first = warp::tiny_v2::write_string(&processor.get_mappings(&layers)?)?;
	let second = warp::tiny_v2::write_string(&processor.get_mappings(&layers)?)?;
	assert_eq!(first, second);
	Ok(())
}

#[test]
fn dependency_order_is_enforced() -> Result<()> {
	// mojang without its intermediary base
	let layers = vec![mojang_layer()?];
	let err = processor().get_mappings(&layers).unwrap_err();
	assert!(err.to_string().contains("depends on"), "unexpected error: {err}");

	// parchment before the mojang layer it documents
	let parchment = ParchmentLayer::new(ParchmentTreeV1 {
		version: "1.1.0".to_owned(),
		classes: Vec::new(),
		packages: Vec::new(),
	}, true);
	let layers = vec![intermediary_layer()?, MappingLayer::Parchment(parchment), mojang_layer()?];
	let err = processor().get_mappings(&layers).unwrap_err();
	assert!(err.to_string().contains("depends on"), "unexpected error: {err}");
	Ok(())
}

#[test]
fn later_layers_win() -> Result<()> {
	let first = "\
tiny	2	0	intermediary	named
c	net/minecraft/class_1	pkg/Foo
	m	()V	method_1	doFirst
";
	let second = "\
tiny	2	0	intermediary	named
c	net/minecraft/class_1	pkg/Bar
";
	let layers = vec![intermediary_layer()?, file_layer(first)?, file_layer(second)?];
	let tree = processor().get_mappings(&layers)?;

	// the second file renamed the class, the first file's method name stays
	let class = tree.get_class("pkg/Bar")
		.ok_or_else(|| anyhow!("class pkg/Bar is missing"))?;
	assert!(tree.get_class("pkg/Foo").is_none());
	assert!(class.get_method("doFirst", "()V").is_some());
	Ok(())
}

#[test]
fn no_intermediate_mappings_synthesizes_the_namespace() -> Result<()> {
	// pkg/New has no intermediary name; the completer epilogue synthesizes one
	let file = "\
tiny	2	0	named	official
c	pkg/New	x
";
	let tree = warp::tiny_v2::read(file.as_bytes())?;
	let layers = vec![
		intermediary_layer()?,
		MappingLayer::FileBased(FileBasedLayer::new(tree, MappingsNamespace::Named, None)?),
	];

	let processor = LayeredMappingsProcessor::new(LayeredMappingSpec::builder().build(), true);
	let tree = processor.get_mappings(&layers)?;

	let intermediary = tree.namespace("intermediary")?;
	let class = tree.get_class("pkg/New")
		.ok_or_else(|| anyhow!("class pkg/New is missing"))?;
	assert_eq!(class.dst.get(intermediary), Some("pkg/New"));
	Ok(())
}

#[test]
fn only_one_unpick_layer_is_allowed() -> Result<()> {
	let processor = processor();

	let none: Vec<MappingLayer> = vec![intermediary_layer()?];
	assert!(processor.get_unpick_data(&none)?.is_none());

	let one = vec![intermediary_layer()?, unpick_layer("net.fabricmc.unpick")];
	let data = processor.get_unpick_data(&one)?
		.ok_or_else(|| anyhow!("unpick data is missing"))?;
	assert_eq!(data.metadata.unpick_group, "net.fabricmc.unpick");

	let two = vec![intermediary_layer()?, unpick_layer("a"), unpick_layer("b")];
	let err = processor.get_unpick_data(&two).unwrap_err();
	assert_eq!(err.to_string(), "only one unpick layer is currently supported");
	Ok(())
}
