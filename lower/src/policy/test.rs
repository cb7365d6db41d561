// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

use crate::acl::{
    AclService, AddressSpec, ExtendedAccessList, ExtendedAclLine, StandardAccessList,
    StandardAclLine,
};
use crate::policy::{
    CommunityElement, CommunityList, CommunityRef, Continue, Disposition, PolicyStatement,
    PrefixList, PrefixListLine, PrefixRange, PrefixSet, RouteMap, RouteMapClause, RouteMapMatch,
    RoutePolicy, RoutePolicyBoolean, SetAction, StandardCommunityLine,
};
use crate::{
    CompiledDevice, ContinuePolicy, DeviceBuilder, LowerError, LoweringSettings,
    LoweringSettingsBuilder, Structure,
};
use canon::eval::{Route, RouteEnv};
use canon::{LineAction, LongExpr, Statement};
use ipnet::IpNet;
use names::{StructureId, StructureKind, WarningKind, canonical_clause_name, canonical_name};
use pretty_assertions::assert_eq;
use tracing_test::traced_test;

fn compile_with(
    settings: LoweringSettings,
    populate: impl FnOnce(&mut DeviceBuilder),
) -> CompiledDevice {
    let mut builder = DeviceBuilder::new("r1", settings);
    populate(&mut builder);
    builder.build().compile()
}

fn compile(populate: impl FnOnce(&mut DeviceBuilder)) -> CompiledDevice {
    compile_with(LoweringSettings::default(), populate)
}

fn routes(device: &CompiledDevice) -> RouteEnv {
    RouteEnv {
        policies: device.routing_policies.clone(),
        route_filters: device.route_filters.clone(),
        community_defs: device.community_defs.clone(),
        ..RouteEnv::default()
    }
}

fn net(s: &str) -> IpNet {
    s.parse().unwrap()
}

fn route_map(name: &str) -> String {
    canonical_name(StructureKind::RouteMap, name)
}

fn route_policy(name: &str) -> String {
    canonical_name(StructureKind::RoutePolicy, name)
}

fn prefix_list(builder: &mut DeviceBuilder, name: &str, prefix: &str, le: u8) {
    let list = PrefixList::default().with_line(PrefixListLine::new(
        LineAction::Permit,
        PrefixRange::exact(net(prefix)).le(le),
    ));
    let structure = if prefix.contains(':') {
        Structure::Ipv6PrefixList(list)
    } else {
        Structure::PrefixList(list)
    };
    builder.define(name, structure, None).unwrap();
}

fn define_map(builder: &mut DeviceBuilder, name: &str, map: RouteMap) {
    builder
        .define(name, Structure::RouteMap(map), None)
        .unwrap();
}

fn tag_is(tag: u64) -> RouteMapMatch {
    RouteMapMatch::Tag(vec![tag])
}

#[test]
#[traced_test]
fn continue_carries_sets_forward() {
    let device = compile(|builder| {
        prefix_list(builder, "CUSTOMER", "10.0.0.0/8", 32);
        builder
            .define(
                "TAGGED",
                Structure::CommunityList(CommunityList::Standard(vec![StandardCommunityLine {
                    action: LineAction::Permit,
                    communities: vec![(65000 << 16) | 1],
                }])),
                None,
            )
            .unwrap();
        let map = RouteMap::default()
            .with_clause(
                10,
                RouteMapClause::permit()
                    .with_match(RouteMapMatch::IpPrefixList(vec!["CUSTOMER".into()]))
                    .with_set(SetAction::Community {
                        communities: CommunityRef::Inline(vec![CommunityElement::literal(
                            65000, 1,
                        )]),
                        additive: true,
                    })
                    .continue_to(Continue::Clause(20)),
            )
            .with_clause(
                20,
                RouteMapClause::permit()
                    .with_match(RouteMapMatch::Community(vec!["TAGGED".into()]))
                    .with_set(SetAction::LocalPreference(LongExpr::Literal(200))),
            )
            .with_clause(30, RouteMapClause::deny());
        define_map(builder, "IMPORT", map);
    });
    assert!(device.failures.is_empty());
    for seq in [10, 20, 30] {
        assert!(
            device
                .routing_policies
                .contains_key(&canonical_clause_name("IMPORT", seq))
        );
    }
    assert_eq!(
        device.routing_policies[&route_map("IMPORT")].statements,
        vec![
            Statement::SetDefaultActionReject,
            Statement::Call(canonical_clause_name("IMPORT", 10)),
        ]
    );

    let env = routes(&device);
    let mut customer = Route::bgp(net("10.1.0.0/16"));
    assert!(env.process(&route_map("IMPORT"), &mut customer));
    assert!(customer.has_community(65000, 1));
    assert_eq!(customer.local_preference, 200);

    let mut tagged = Route::bgp(net("192.0.2.0/24")).with_community(65000, 1);
    assert!(env.process(&route_map("IMPORT"), &mut tagged));
    assert_eq!(tagged.local_preference, 200);

    let mut other = Route::bgp(net("192.0.2.0/24"));
    assert!(!env.process(&route_map("IMPORT"), &mut other));
    assert!(logs_contain("Lowering"));
}

#[test]
fn continue_to_prior_clause_is_rejected() {
    let map = || {
        RouteMap::default()
            .with_clause(10, RouteMapClause::deny().with_match(tag_is(1)))
            .with_clause(20, RouteMapClause::permit().continue_to(Continue::Clause(10)))
    };

    let device = compile(|builder| define_map(builder, "BACK", map()));
    assert_eq!(
        device.failures[&StructureId::new(StructureKind::RouteMap, "BACK")],
        LowerError::InvalidContinue {
            clause: 20,
            target: 10
        }
    );
    assert!(device.diagnostics.has(WarningKind::SuspiciousContinue));
    assert!(device.routing_policies.is_empty());

    let settings = LoweringSettingsBuilder::default()
        .continue_policy(ContinuePolicy::BestEffort)
        .build()
        .unwrap();
    let device = compile_with(settings, |builder| define_map(builder, "BACK", map()));
    assert!(device.failures.is_empty());
    assert!(device.diagnostics.has(WarningKind::SuspiciousContinue));
    let env = routes(&device);
    assert!(!env.process(&route_map("BACK"), &mut Route::bgp(net("192.0.2.0/24")).with_tag(1)));
    assert!(env.process(&route_map("BACK"), &mut Route::bgp(net("192.0.2.0/24"))));
}

#[test]
fn continue_to_missing_clause() {
    let device = compile(|builder| {
        let map = RouteMap::default()
            .with_clause(
                10,
                RouteMapClause::permit()
                    .with_match(tag_is(1))
                    .continue_to(Continue::Clause(15))
                    .at_line(40),
            )
            .with_clause(
                20,
                RouteMapClause::permit().with_set(SetAction::Tag(LongExpr::Literal(20))),
            );
        define_map(builder, "GAP", map);
    });
    assert!(device.failures.is_empty());
    let undefined = device.diagnostics.undefined_references();
    assert_eq!(undefined.len(), 1);
    assert_eq!(
        undefined[0].target,
        StructureId::new(StructureKind::RouteMapClause, "GAP~15")
    );
    assert_eq!(undefined[0].line, Some(40));
    let warning = device
        .diagnostics
        .warnings_of(WarningKind::UndefinedReference)
        .next()
        .unwrap();
    assert_eq!(
        warning.subject,
        Some(StructureId::new(StructureKind::RouteMap, "GAP"))
    );
    // clause names are not structures of their own
    assert!(device.unused.iter().all(|id| id.kind != StructureKind::RouteMapClause));

    let env = routes(&device);
    let mut tagged = Route::bgp(net("192.0.2.0/24")).with_tag(1);
    assert!(env.process(&route_map("GAP"), &mut tagged));
    assert_eq!(tagged.tag, 1);
    let mut other = Route::bgp(net("192.0.2.0/24"));
    assert!(env.process(&route_map("GAP"), &mut other));
    assert_eq!(other.tag, 20);
}

#[test]
fn clauses_run_in_ascending_order() {
    let device = compile(|builder| {
        let map = RouteMap::default()
            .with_clause(
                30,
                RouteMapClause::permit().with_set(SetAction::Tag(LongExpr::Literal(30))),
            )
            .with_clause(20, RouteMapClause::deny().with_match(tag_is(5)))
            .with_clause(
                10,
                RouteMapClause::permit()
                    .with_match(tag_is(5))
                    .with_match(RouteMapMatch::LocalPreference(300)),
            );
        define_map(builder, "ORDER", map);
    });
    let policy = &device.routing_policies[&route_map("ORDER")];
    assert_eq!(policy.statements.len(), 2);
    assert_eq!(policy.statements[0], Statement::SetDefaultActionReject);
    let first = canonical_clause_name("ORDER", 10);
    assert!(
        matches!(&policy.statements[1], Statement::If(i) if i.comment.as_ref() == Some(&first))
    );

    let env = routes(&device);
    let mut preferred = Route::bgp(net("192.0.2.0/24")).with_tag(5);
    preferred.local_preference = 300;
    assert!(env.process(&route_map("ORDER"), &mut preferred));
    assert_eq!(preferred.tag, 5);
    assert!(!env.process(&route_map("ORDER"), &mut Route::bgp(net("192.0.2.0/24")).with_tag(5)));
    let mut other = Route::bgp(net("192.0.2.0/24"));
    assert!(env.process(&route_map("ORDER"), &mut other));
    assert_eq!(other.tag, 30);
}

#[test]
fn neighbor_match_fails_its_map_only() {
    let device = compile(|builder| {
        let bad = RouteMap::default().with_clause(
            10,
            RouteMapClause::permit()
                .with_match(RouteMapMatch::Neighbor(vec!["192.0.2.1".parse().unwrap()])),
        );
        define_map(builder, "BAD", bad);
        define_map(
            builder,
            "GOOD",
            RouteMap::default().with_clause(10, RouteMapClause::permit()),
        );
    });
    assert!(matches!(
        device.failures[&StructureId::new(StructureKind::RouteMap, "BAD")],
        LowerError::Unsupported(_)
    ));
    assert!(!device.routing_policies.contains_key(&route_map("BAD")));
    assert!(
        routes(&device).process(&route_map("GOOD"), &mut Route::bgp(net("192.0.2.0/24")))
    );
}

#[test]
fn address_lines_are_or_ed_under_match_all() {
    let device = compile(|builder| {
        prefix_list(builder, "V4", "10.0.0.0/8", 32);
        prefix_list(builder, "V6", "2001:db8::/32", 64);
        let map = RouteMap::default().with_clause(
            10,
            RouteMapClause::permit()
                .with_match(RouteMapMatch::IpPrefixList(vec!["V4".into()]))
                .with_match(RouteMapMatch::Ipv6PrefixList(vec!["V6".into()]))
                .with_match(tag_is(7)),
        );
        define_map(builder, "DUAL", map);
    });
    assert!(device.unused.iter().all(|id| id.kind != StructureKind::PrefixList));
    let env = routes(&device);
    let process = |prefix: &str, tag: u64| {
        env.process(&route_map("DUAL"), &mut Route::bgp(net(prefix)).with_tag(tag))
    };
    assert!(process("10.0.0.0/24", 7));
    assert!(process("2001:db8:1::/48", 7));
    assert!(!process("10.0.0.0/24", 0));
    assert!(!process("192.0.2.0/24", 7));
}

#[test]
fn match_ip_address_uses_standard_acls() {
    let device = compile(|builder| {
        let std = StandardAccessList::default().with_line(StandardAclLine::new(
            LineAction::Permit,
            AddressSpec::Subnet(net("10.0.0.0/8")),
        ));
        let ext = ExtendedAccessList::default().with_line(ExtendedAclLine::new(
            LineAction::Permit,
            AclService::Protocol(None),
            AddressSpec::Any,
            AddressSpec::Any,
        ));
        builder
            .define("STD", Structure::StandardAccessList(std), None)
            .unwrap();
        builder
            .define("EXT", Structure::ExtendedAccessList(ext), None)
            .unwrap();
        for acl in ["STD", "EXT"] {
            let map = RouteMap::default().with_clause(
                10,
                RouteMapClause::permit().with_match(RouteMapMatch::IpAddress(vec![acl.into()])),
            );
            define_map(builder, &format!("BY-{acl}"), map);
        }
    });
    assert!(device.failures.is_empty());
    let unsupported: Vec<_> = device
        .diagnostics
        .warnings_of(WarningKind::Unsupported)
        .collect();
    assert_eq!(unsupported.len(), 1);
    assert_eq!(
        unsupported[0].subject,
        Some(StructureId::new(StructureKind::RouteMap, "BY-EXT"))
    );

    let env = routes(&device);
    let ten = || Route::bgp(net("10.2.0.0/16"));
    assert!(env.process(&route_map("BY-STD"), &mut ten()));
    assert!(!env.process(&route_map("BY-STD"), &mut Route::bgp(net("192.0.2.0/24"))));
    assert!(!env.process(&route_map("BY-EXT"), &mut ten()));
}

#[test]
fn route_policy_dispositions() {
    let device = compile(|builder| {
        builder
            .define(
                "CUSTOMERS",
                Structure::PrefixSet(PrefixSet {
                    elements: vec![PrefixRange::exact(net("10.0.0.0/8")).le(24)],
                }),
                None,
            )
            .unwrap();
        let policy = RoutePolicy::new(vec![PolicyStatement::If {
            branches: vec![
                (
                    RoutePolicyBoolean::DestinationIn("CUSTOMERS".into()),
                    vec![
                        PolicyStatement::Set(SetAction::LocalPreference(LongExpr::Literal(300))),
                        PolicyStatement::Disposition(Disposition::Done),
                    ],
                ),
                (
                    RoutePolicyBoolean::CommunityMatchesAny(CommunityRef::Inline(vec![
                        CommunityElement::literal(65000, 9),
                    ])),
                    vec![PolicyStatement::Disposition(Disposition::Drop)],
                ),
            ],
            otherwise: vec![PolicyStatement::Disposition(Disposition::Pass)],
        }]);
        builder
            .define("IN", Structure::RoutePolicy(policy), None)
            .unwrap();
        builder
            .define("SILENT", Structure::RoutePolicy(RoutePolicy::default()), None)
            .unwrap();
    });
    assert!(device.failures.is_empty());
    let env = routes(&device);

    let mut customer = Route::bgp(net("10.1.0.0/16"));
    assert!(env.process(&route_policy("IN"), &mut customer));
    assert_eq!(customer.local_preference, 300);
    let mut blackholed = Route::bgp(net("192.0.2.0/24")).with_community(65000, 9);
    assert!(!env.process(&route_policy("IN"), &mut blackholed));
    let mut passed = Route::bgp(net("192.0.2.0/24"));
    assert!(env.process(&route_policy("IN"), &mut passed));
    assert_eq!(passed.local_preference, 100);

    assert!(!env.process(&route_policy("SILENT"), &mut Route::bgp(net("10.1.0.0/16"))));
}

#[test]
#[traced_test]
fn apply_cycles_fail_every_policy_reaching_them() {
    let apply = |name: &str| PolicyStatement::Apply(name.into());
    let device = compile(|builder| {
        for (name, statements) in [
            ("A", vec![apply("B")]),
            ("B", vec![apply("A")]),
            ("C", vec![apply("A")]),
            ("D", vec![apply("E")]),
            (
                "E",
                vec![
                    PolicyStatement::Set(SetAction::Tag(LongExpr::Literal(7))),
                    PolicyStatement::Disposition(Disposition::Pass),
                ],
            ),
        ] {
            builder
                .define(name, Structure::RoutePolicy(RoutePolicy::new(statements)), None)
                .unwrap();
        }
    });
    let failure =
        |name: &str| &device.failures[&StructureId::new(StructureKind::RoutePolicy, name)];
    assert_eq!(
        failure("A"),
        &LowerError::CircularReference(vec!["A".into(), "B".into(), "A".into()])
    );
    assert_eq!(
        failure("C"),
        &LowerError::CircularReference(vec!["A".into(), "B".into(), "A".into()])
    );
    assert!(matches!(failure("B"), LowerError::CircularReference(_)));
    assert_eq!(device.failures.len(), 3);
    assert_eq!(
        device
            .diagnostics
            .warnings_of(WarningKind::CircularReference)
            .count(),
        3
    );

    let env = routes(&device);
    let mut route = Route::bgp(net("192.0.2.0/24"));
    assert!(env.process(&route_policy("D"), &mut route));
    assert_eq!(route.tag, 7);
    assert!(logs_contain("Failed to lower"));
}
