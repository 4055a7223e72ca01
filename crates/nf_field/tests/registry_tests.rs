// crates/nf_field/tests/registry_tests.rs
//!
//! 场仓库注册与生命周期测试
//!
//! 覆盖声明幂等性、延迟分配、时间态轮转、填充规则注册和
//! 层级生命周期的断言语义

use glam::IVec3;
use nf_field::{DomainBcConfig, FieldRepo, FieldState, FillRule};
use nf_foundation::MeshLocation;
use nf_mesh::{DomainConfig, GridBox, PatchLayout};

/// 8^3 三周期域上的空仓库
fn periodic_repo() -> FieldRepo {
    let cfg = DomainConfig {
        cells: [8, 8, 8],
        periodic: [true; 3],
        max_patch_size: 4,
        ..Default::default()
    };
    let (geometry, _) = cfg.build_level0().unwrap();
    FieldRepo::new(geometry, cfg.ref_ratio)
}

fn level0_layout() -> PatchLayout {
    PatchLayout::chunk(GridBox::cube(8), 4, 1)
}

fn level1_layout() -> PatchLayout {
    PatchLayout::chunk(GridBox::new(IVec3::splat(4), IVec3::splat(12)), 4, 1)
}

#[test]
fn test_declare_idempotent() {
    let mut repo = periodic_repo();
    repo.declare_cc_field("density", 1, 2, 2).unwrap();
    // 相同签名重复声明返回同一场
    repo.declare_cc_field("density", 1, 2, 2).unwrap();
    assert_eq!(repo.fields().count(), 1);
    assert!(repo.field_exists("density"));
    assert!(!repo.field_exists("pressure"));
}

#[test]
fn test_declare_signature_mismatch_is_fatal() {
    let mut repo = periodic_repo();
    repo.declare_cc_field("density", 1, 2, 2).unwrap();
    assert!(repo.declare_cc_field("density", 2, 2, 2).is_err());
    assert!(repo.declare_cc_field("density", 1, 1, 2).is_err());
    assert!(repo.declare_cc_field("density", 1, 2, 1).is_err());
    assert!(repo.declare_nd_field("density", 1, 2, 2).is_err());
    // 失败的重声明不产生新记录
    assert_eq!(repo.fields().count(), 1);
}

#[test]
fn test_deferred_allocation_before_first_level() {
    let mut repo = periodic_repo();
    repo.declare_cc_field("density", 1, 2, 1).unwrap();
    assert_eq!(repo.num_active_levels(), 0);

    // 首次建层一次性补齐所有已声明的槽
    repo.make_new_level_from_scratch(0, 0.0, level0_layout());
    let density = repo.get_field("density");
    let set = density.patches(0);
    assert_eq!(set.num_patches(), 8);
    assert_eq!(set.patch(0).get(IVec3::ZERO, 0), 0.0);
}

#[test]
fn test_declare_after_level_allocates_immediately() {
    let mut repo = periodic_repo();
    repo.make_new_level_from_scratch(0, 0.0, level0_layout());
    repo.declare_cc_field("scalar", 2, 1, 1).unwrap();
    let field = repo.get_field("scalar");
    assert_eq!(field.ncomp(), 2);
    assert_eq!(field.patches(0).patch(0).get(IVec3::ZERO, 1), 0.0);
}

#[test]
#[should_panic(expected = "未激活")]
fn test_access_without_level_panics() {
    let mut repo = periodic_repo();
    repo.declare_cc_field("density", 1, 2, 1).unwrap();
    let _ = repo.get_field("density").patches(0);
}

#[test]
#[should_panic(expected = "未知字段")]
fn test_unknown_field_panics() {
    let repo = periodic_repo();
    let _ = repo.get_field("vorticity");
}

#[test]
#[should_panic(expected = "只保留")]
fn test_state_out_of_range_panics() {
    let mut repo = periodic_repo();
    repo.declare_cc_field("density", 1, 2, 1).unwrap();
    let _ = repo.get_field_state("density", FieldState::Old);
}

#[test]
fn test_advance_states_rotates_slots_without_copy() {
    let mut repo = periodic_repo();
    repo.declare_cc_field("q", 1, 0, 2).unwrap();
    repo.make_new_level_from_scratch(0, 0.0, level0_layout());
    {
        let q = repo.get_field("q");
        q.patches_mut(0).fill_all(1.0);
        q.with_state(FieldState::Old).patches_mut(0).fill_all(2.0);
    }
    repo.advance_states();

    // 推进后：原新态数据成为旧态，原旧态缓冲回收为新态
    let q = repo.get_field("q");
    assert_eq!(
        q.with_state(FieldState::Old).patches(0).patch(0).get(IVec3::ZERO, 0),
        1.0
    );
    assert_eq!(q.patches(0).patch(0).get(IVec3::ZERO, 0), 2.0);

    // 再推进一次回到初始对应关系
    repo.advance_states();
    let q = repo.get_field("q");
    assert_eq!(q.patches(0).patch(0).get(IVec3::ZERO, 0), 1.0);
}

#[test]
fn test_single_state_field_unaffected_by_advance() {
    let mut repo = periodic_repo();
    repo.declare_cc_field("mono", 1, 0, 1).unwrap();
    repo.make_new_level_from_scratch(0, 0.0, level0_layout());
    repo.get_field("mono").patches_mut(0).fill_all(5.0);
    repo.advance_states();
    assert_eq!(
        repo.get_field("mono").patches(0).patch(0).get(IVec3::ZERO, 0),
        5.0
    );
}

#[test]
fn test_const_scalar_rule_fills_everything() {
    let mut repo = periodic_repo();
    repo.declare_cc_field("mask_frac", 1, 2, 1).unwrap();
    repo.make_new_level_from_scratch(0, 0.0, level0_layout());
    let field = repo.get_field("mask_frac");
    field.register_fill_patch_op(FillRule::ConstScalar(3.5));
    assert_eq!(field.fill_rule(), FillRule::ConstScalar(3.5));

    field.fillpatch(0, 0.0);
    let set = field.patches(0);
    for i in 0..set.num_patches() {
        // 含鬼层的整个存储盒都是常数
        for iv in set.patch(i).bounds().iter() {
            assert_eq!(set.patch(i).get(iv, 0), 3.5);
        }
    }
}

#[test]
fn test_null_rule_is_noop() {
    let mut repo = periodic_repo();
    repo.declare_cc_field("forcing", 1, 2, 1).unwrap();
    repo.make_new_level_from_scratch(0, 0.0, level0_layout());
    let field = repo.get_field("forcing");
    field.register_fill_patch_op(FillRule::Null);
    field.patches_mut(0).fill_all(7.0);

    field.fillpatch(0, 0.0);
    field.fillphysbc(0, 0.0);
    field.set_inflow(0, 0.0);
    assert_eq!(field.patches(0).patch(0).get(IVec3::new(-2, -2, -2), 0), 7.0);
}

#[test]
#[should_panic(expected = "不支持入流刷新")]
fn test_const_scalar_rule_rejects_inflow() {
    let mut repo = periodic_repo();
    repo.declare_cc_field("mask_frac", 1, 2, 1).unwrap();
    repo.make_new_level_from_scratch(0, 0.0, level0_layout());
    let field = repo.get_field("mask_frac");
    field.register_fill_patch_op(FillRule::ConstScalar(1.0));
    field.set_inflow(0, 0.0);
}

#[test]
fn test_level_lifecycle_contiguity() {
    let mut repo = periodic_repo();
    repo.declare_cc_field("density", 1, 2, 1).unwrap();
    repo.make_new_level_from_scratch(0, 0.0, level0_layout());
    repo.make_new_level_from_scratch(1, 0.0, level1_layout());
    assert_eq!(repo.num_active_levels(), 2);
    assert_eq!(repo.geometry(1).domain(), GridBox::cube(16));

    repo.clear_level(1);
    assert_eq!(repo.num_active_levels(), 1);
}

#[test]
#[should_panic(expected = "层级必须连续创建")]
fn test_noncontiguous_level_panics() {
    let mut repo = periodic_repo();
    repo.make_new_level_from_scratch(1, 0.0, level1_layout());
}

#[test]
#[should_panic(expected = "只能释放当前最细层级")]
fn test_clear_non_finest_panics() {
    let mut repo = periodic_repo();
    repo.make_new_level_from_scratch(0, 0.0, level0_layout());
    repo.make_new_level_from_scratch(1, 0.0, level1_layout());
    repo.clear_level(0);
}

#[test]
fn test_int_field_injection_from_coarse() {
    let mut repo = periodic_repo();
    repo.declare_int_field("mask", 1, 1, MeshLocation::Cell).unwrap();
    repo.make_new_level_from_scratch(0, 0.0, level0_layout());
    {
        let mask = repo.get_int_field("mask");
        let mut set = mask.patches_mut(0);
        for i in 0..set.num_patches() {
            let region = set.valid_region(i);
            for iv in region.iter() {
                set.patch_mut(i).set(iv, 0, iv.x + 10 * iv.y);
            }
        }
    }

    repo.make_new_level_from_coarse(1, 0.0, level1_layout());

    // 分段常数注入：细单元取粗父单元的值
    let mask = repo.get_int_field("mask");
    let set = mask.patches(1);
    for i in 0..set.num_patches() {
        let region = set.valid_region(i);
        for iv in region.iter() {
            let expect = iv.x.div_euclid(2) + 10 * iv.y.div_euclid(2);
            assert_eq!(set.patch(i).get(iv, 0), expect);
        }
    }
}

#[test]
fn test_scratch_field_covers_active_levels() {
    let mut repo = periodic_repo();
    repo.make_new_level_from_scratch(0, 0.0, level0_layout());
    repo.make_new_level_from_scratch(1, 0.0, level1_layout());

    let mut scratch = repo.create_scratch_field("tmp", 2, 1, MeshLocation::Node);
    assert_eq!(scratch.num_levels(), 2);
    assert_eq!(scratch.location(), MeshLocation::Node);
    scratch.level_mut(1).fill_all(9.0);
    assert_eq!(scratch.level(1).patch(0).get(IVec3::splat(5), 1), 9.0);
    // 不进名称表
    assert!(!repo.field_exists("tmp"));

    let iscratch = repo.create_int_scratch_field("itmp", 1, 0, MeshLocation::Cell);
    assert_eq!(iscratch.num_levels(), 2);
}

#[test]
fn test_apply_domain_bc_rejects_periodic_conflict() {
    let mut repo = periodic_repo();
    repo.declare_cc_field("density", 1, 2, 1).unwrap();
    // 周期轴上声明壁面与域周期性矛盾
    let cfg = DomainBcConfig::from_json(
        r#"{ "xlo": { "kind": "no_slip_wall" }, "xhi": { "kind": "no_slip_wall" } }"#,
    )
    .unwrap();
    assert!(repo.apply_domain_bc(&cfg).is_err());

    // 全周期声明一致
    assert!(repo.apply_domain_bc(&DomainBcConfig::default()).is_ok());
}

#[test]
fn test_face_normal_siblings_declaration() {
    let mut repo = periodic_repo();
    repo.declare_face_normal_field(["umac", "vmac", "wmac"], 1, 2, 1)
        .unwrap();
    assert_eq!(repo.get_field("umac").location(), MeshLocation::XFace);
    assert_eq!(repo.get_field("vmac").location(), MeshLocation::YFace);
    assert_eq!(repo.get_field("wmac").location(), MeshLocation::ZFace);
}
