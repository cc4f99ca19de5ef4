use glam::{DVec3, IVec3};
use nebula_blueprint::{
    Axis, BlockId, BlockState, Blueprint, EntityOffset, Flavor, MemoryWorld, Rotation,
    SchematicFactory, SchematicRegistry, WorldAccess,
};
use quartz_nbt::{NbtCompound, NbtTag};

fn registry() -> SchematicRegistry {
    let mut registry = SchematicRegistry::new();
    for block in ["stone", "oak_log", "furnace"] {
        registry.register(block, SchematicFactory::standard()).unwrap();
    }
    registry.register("fire", SchematicFactory::non_capturable()).unwrap();
    registry
}

/// An L-shaped wall with a furnace, a log, and a stray fire block.
fn build_world() -> MemoryWorld {
    let mut world = MemoryWorld::new();
    world.insert(IVec3::new(0, 0, 0), BlockState::new("stone"));
    world.insert(IVec3::new(1, 0, 0), BlockState::new("stone"));
    world.insert(IVec3::new(2, 0, 0), BlockState::new("stone"));
    world.insert(IVec3::new(0, 0, 1), BlockState::new("stone"));
    world.insert(
        IVec3::new(0, 1, 0),
        BlockState::new("furnace").with_property("facing", "north"),
    );
    world.insert(
        IVec3::new(1, 1, 0),
        BlockState::new("oak_log").with_property("axis", "x"),
    );
    world.insert(IVec3::new(2, 1, 1), BlockState::new("fire"));
    world
}

#[test]
fn test_capture_save_load_rotate_place() {
    let world = build_world();
    let registry = registry();
    let mut blueprint = Blueprint::capture(&world, &registry, IVec3::ZERO, IVec3::new(3, 2, 2)).unwrap();
    assert!(blueprint.is_complete());

    let mut data = NbtCompound::new();
    data.insert("id", NbtTag::String("sheep".to_string()));
    blueprint.add_entity(EntityOffset::new(DVec3::new(2.5, 0.0, 1.5), data));

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("wall.nbt");
    blueprint.save(&path, Flavor::GzCompressed).unwrap();
    let mut loaded = Blueprint::load(&path, &registry, Flavor::GzCompressed).unwrap();
    assert_eq!(loaded, blueprint);

    loaded.rotate(Axis::Y, Rotation::Clockwise90);
    assert_eq!(loaded.size(), IVec3::new(2, 2, 3));

    let mut target = MemoryWorld::new();
    let anchor = IVec3::new(100, 10, 100);
    let report = loaded.place_into(&mut target, anchor).unwrap();
    assert_eq!(report.blocks_placed, 6);
    assert_eq!(report.air_cleared, 6);
    assert_eq!(report.entities_spawned, 1);

    // Rotating about the anchor: world (x, y, z) -> (-z, y, x) around it.
    let furnace = target.block_at(anchor + IVec3::new(0, 1, 0)).unwrap();
    assert_eq!(furnace.block, BlockId::new("furnace"));
    assert_eq!(furnace.property("facing"), Some("east"));

    let log = target.block_at(anchor + IVec3::new(0, 1, 1)).unwrap();
    assert_eq!(log.block, BlockId::new("oak_log"));
    assert_eq!(log.property("axis"), Some("z"));

    for stone in [IVec3::new(0, 0, 2), IVec3::new(-1, 0, 0)] {
        assert_eq!(
            target.block_type_at(anchor + stone).unwrap(),
            BlockId::new("stone"),
            "{stone}"
        );
    }
    // The fire was never captured.
    assert!(target.block_type_at(anchor + IVec3::new(-1, 1, 2)).unwrap().is_air());
}

#[test]
fn test_mirror_then_place_reflects_region() {
    let world = build_world();
    let registry = registry();
    let mut blueprint = Blueprint::capture(&world, &registry, IVec3::ZERO, IVec3::new(3, 2, 2)).unwrap();
    blueprint.mirror(Axis::X);

    let mut target = MemoryWorld::new();
    blueprint.place_into(&mut target, IVec3::ZERO).unwrap();
    // World x is reflected through the anchor.
    let furnace = target.block_at(IVec3::new(0, 1, 0)).unwrap();
    assert_eq!(furnace.block, BlockId::new("furnace"));
    assert_eq!(
        target.block_type_at(IVec3::new(-2, 0, 0)).unwrap(),
        BlockId::new("stone")
    );
    assert_eq!(
        target.block_type_at(IVec3::new(-1, 1, 0)).unwrap(),
        BlockId::new("oak_log")
    );
}

#[test]
fn test_unregistered_block_needs_permissive_registry() {
    let mut world = MemoryWorld::new();
    world.insert(IVec3::ZERO, BlockState::new("obsidian"));
    let permissive = SchematicRegistry::permissive();
    let mut foreign = registry();
    foreign.register("obsidian", SchematicFactory::standard()).unwrap();
    let blueprint = Blueprint::capture(&world, &foreign, IVec3::ZERO, IVec3::ONE).unwrap();

    let mut buf = Vec::new();
    blueprint.write_to(&mut buf, Flavor::Uncompressed).unwrap();
    assert!(Blueprint::read_from(&mut buf.as_slice(), &registry(), Flavor::Uncompressed).is_err());
    let decoded = Blueprint::read_from(&mut buf.as_slice(), &permissive, Flavor::Uncompressed).unwrap();
    assert_eq!(decoded, blueprint);
}
