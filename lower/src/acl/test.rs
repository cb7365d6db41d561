// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

use crate::acl::{
    AclService, AddressSpec, ClassMap, ClassMapMatch, ExtendedAccessList, ExtendedAclLine,
    NetworkGroupLine, NetworkObject, NetworkObjectGroup, PortGroupLine, PortMatch,
    PortObjectGroup, PortSpec, ServiceGroupLine, ServiceObjectGroup, StandardAccessList,
    StandardAclLine,
};
use crate::{CompiledDevice, DeviceBuilder, LowerError, LoweringSettings, MatchSemantics, Structure};
use canon::eval::{Flow, PacketEnv};
use canon::{IpProtocol, IpSpace, IpWildcard, LineAction};
use ipnet::IpNet;
use names::{StructureId, StructureKind, WarningKind, canonical_name};
use pretty_assertions::assert_eq;
use std::net::{IpAddr, Ipv4Addr};
use tracing_test::traced_test;

fn compile(populate: impl FnOnce(&mut DeviceBuilder)) -> CompiledDevice {
    let mut builder = DeviceBuilder::new("fw1", LoweringSettings::default());
    populate(&mut builder);
    builder.build().compile()
}

fn packets(device: &CompiledDevice) -> PacketEnv {
    PacketEnv::new(device.ip_spaces.clone(), device.acls.clone())
}

fn net(s: &str) -> IpNet {
    s.parse().unwrap()
}

fn v4(s: &str) -> IpAddr {
    s.parse().unwrap()
}

fn permit(service: AclService, src: AddressSpec, dst: AddressSpec) -> ExtendedAclLine {
    ExtendedAclLine::new(LineAction::Permit, service, src, dst)
}

fn tcp() -> AclService {
    AclService::Protocol(Some(IpProtocol::TCP))
}

fn ext_acl(name: &str) -> String {
    canonical_name(StructureKind::ExtendedAccessList, name)
}

const CLIENT: Ipv4Addr = Ipv4Addr::new(172, 16, 0, 9);

fn servers(builder: &mut DeviceBuilder) {
    let group = NetworkObjectGroup::default()
        .with_line(NetworkGroupLine::Host(v4("10.0.0.1")))
        .with_line(NetworkGroupLine::Subnet(net("10.1.0.0/16")))
        .with_line(NetworkGroupLine::Group("MORE".into()));
    builder
        .define("SERVERS", Structure::NetworkObjectGroup(group), Some(10))
        .unwrap();
    builder
        .define(
            "MORE",
            Structure::NetworkObjectGroup(
                NetworkObjectGroup::default().with_line(NetworkGroupLine::Range {
                    first: v4("10.2.0.1"),
                    last: v4("10.2.0.9"),
                }),
            ),
            Some(14),
        )
        .unwrap();
    let web = ExtendedAccessList::default().with_line(
        permit(tcp(), AddressSpec::Any, AddressSpec::ObjectGroup("SERVERS".into()))
            .dst_ports(PortMatch::Spec(PortSpec::Eq(vec![80])))
            .text("permit tcp any object-group SERVERS eq www")
            .at_line(20),
    );
    builder
        .define("WEB", Structure::ExtendedAccessList(web), Some(20))
        .unwrap();
}

#[test]
fn network_group_is_disjunction_of_lines() {
    let device = compile(servers);
    assert!(device.failures.is_empty());
    assert!(device.diagnostics.undefined_references().is_empty());
    assert_eq!(
        device.unused,
        vec![StructureId::new(StructureKind::ExtendedAccessList, "WEB")]
    );
    assert_eq!(
        device.ip_spaces[&canonical_name(StructureKind::NetworkObjectGroup, "SERVERS")]
            .references(),
        vec![canonical_name(StructureKind::NetworkObjectGroup, "MORE").as_str()]
    );

    let env = packets(&device);
    let web = ext_acl("WEB");
    let in_group = |dst: Ipv4Addr| {
        dst == Ipv4Addr::new(10, 0, 0, 1)
            || net("10.1.0.0/16").contains(&IpAddr::V4(dst))
            || (Ipv4Addr::new(10, 2, 0, 1)..=Ipv4Addr::new(10, 2, 0, 9)).contains(&dst)
    };
    bolero::check!()
        .with_type::<(u32, u16)>()
        .for_each(|(dst, port)| {
            let dst = Ipv4Addr::from(*dst);
            let expected = if in_group(dst) && *port == 80 {
                LineAction::Permit
            } else {
                LineAction::Deny
            };
            assert_eq!(env.filter_named(&web, &Flow::tcp(CLIENT, dst, *port)), expected);
        });
    for dst in ["10.0.0.1", "10.1.200.3", "10.2.0.9"] {
        let dst: Ipv4Addr = dst.parse().unwrap();
        assert_eq!(env.filter_named(&web, &Flow::tcp(CLIENT, dst, 80)), LineAction::Permit);
        assert_eq!(env.filter_named(&web, &Flow::udp(CLIENT, dst, 80)), LineAction::Deny);
    }
}

fn class_map_device(semantics: Option<MatchSemantics>) -> CompiledDevice {
    compile(|builder| {
        let any_tcp = ExtendedAccessList::default().with_line(permit(
            tcp(),
            AddressSpec::Any,
            AddressSpec::Any,
        ));
        let to_host = ExtendedAccessList::default().with_line(permit(
            AclService::Protocol(None),
            AddressSpec::Any,
            AddressSpec::Host(v4("10.0.0.1")),
        ));
        builder
            .define("TCP", Structure::ExtendedAccessList(any_tcp), None)
            .unwrap();
        builder
            .define("HOST", Structure::ExtendedAccessList(to_host), None)
            .unwrap();
        let class_map = ClassMap::new(semantics)
            .with_line(ClassMapMatch::AccessGroup("TCP".into()))
            .with_line(ClassMapMatch::AccessGroup("HOST".into()));
        builder
            .define("CM", Structure::ClassMap(class_map), None)
            .unwrap();
    })
}

#[test]
fn class_map_semantics() {
    let cm = canonical_name(StructureKind::ClassMap, "CM");
    let host = Ipv4Addr::new(10, 0, 0, 1);
    let other = Ipv4Addr::new(10, 0, 0, 2);
    let cases = [
        (Flow::tcp(CLIENT, host, 22), true),
        (Flow::tcp(CLIENT, other, 22), false),
        (Flow::udp(CLIENT, host, 53), false),
        (Flow::udp(CLIENT, other, 53), false),
    ];

    // match-all is the default
    for semantics in [Some(MatchSemantics::MatchAll), None] {
        let device = class_map_device(semantics);
        assert_eq!(
            device.unused,
            vec![StructureId::new(StructureKind::ClassMap, "CM")]
        );
        let env = packets(&device);
        for (flow, both) in &cases {
            let expected = if *both { LineAction::Permit } else { LineAction::Deny };
            assert_eq!(env.filter_named(&cm, flow), expected, "{flow:?}");
        }
    }

    let env = packets(&class_map_device(Some(MatchSemantics::MatchAny)));
    assert_eq!(env.filter_named(&cm, &cases[1].0), LineAction::Permit);
    assert_eq!(env.filter_named(&cm, &cases[2].0), LineAction::Permit);
    assert_eq!(env.filter_named(&cm, &cases[3].0), LineAction::Deny);
}

#[test]
fn undefined_group_matches_nothing() {
    let device = compile(|builder| {
        let acl = ExtendedAccessList::default()
            .with_line(permit(
                AclService::Protocol(None),
                AddressSpec::Any,
                AddressSpec::ObjectGroup("MISSING".into()),
            ))
            .with_line(ExtendedAclLine::new(
                LineAction::Deny,
                AclService::ServiceGroup("ALSO-MISSING".into()),
                AddressSpec::Any,
                AddressSpec::Any,
            ));
        builder
            .define("X", Structure::ExtendedAccessList(acl), None)
            .unwrap();
    });
    assert!(device.failures.is_empty());
    assert_eq!(
        device
            .diagnostics
            .warnings_of(WarningKind::UndefinedReference)
            .count(),
        2
    );
    let targets: Vec<_> = device
        .diagnostics
        .undefined_references()
        .iter()
        .map(|r| r.target.clone())
        .collect();
    assert_eq!(
        targets,
        vec![
            StructureId::new(StructureKind::NetworkObjectGroup, "MISSING"),
            StructureId::new(StructureKind::ServiceObjectGroup, "ALSO-MISSING"),
        ]
    );
    let acl = StructureId::new(StructureKind::ExtendedAccessList, "X");
    for warning in device.diagnostics.warnings_of(WarningKind::UndefinedReference) {
        assert_eq!(warning.subject.as_ref(), Some(&acl));
    }

    let env = packets(&device);
    let x = ext_acl("X");
    bolero::check!()
        .with_type::<(u32, u32, u16)>()
        .for_each(|(src, dst, port)| {
            let flow = Flow::tcp(Ipv4Addr::from(*src), Ipv4Addr::from(*dst), *port);
            assert_eq!(env.filter_named(&x, &flow), LineAction::Deny);
        });
}

#[test]
fn fqdn_object_is_unsupported() {
    let device = compile(|builder| {
        builder
            .define(
                "WWW",
                Structure::NetworkObject(NetworkObject::Fqdn("www.example.com".into())),
                Some(3),
            )
            .unwrap();
    });
    assert_eq!(
        device.ip_spaces[&canonical_name(StructureKind::NetworkObject, "WWW")],
        IpSpace::Empty
    );
    let warning = device
        .diagnostics
        .warnings_of(WarningKind::Unsupported)
        .next()
        .unwrap();
    assert_eq!(
        warning.subject,
        Some(StructureId::new(StructureKind::NetworkObject, "WWW"))
    );
    assert_eq!(warning.line, Some(3));
}

#[test]
fn port_group_on_either_field() {
    let device = compile(|builder| {
        let ports = PortObjectGroup {
            lines: vec![
                PortGroupLine::Port(PortSpec::Eq(vec![80, 443])),
                PortGroupLine::Port(PortSpec::Range(8000, 8080)),
            ],
        };
        builder
            .define("WEBPORTS", Structure::PortObjectGroup(ports), None)
            .unwrap();
        let to_web = ExtendedAccessList::default().with_line(
            permit(tcp(), AddressSpec::Any, AddressSpec::Any)
                .dst_ports(PortMatch::Group("WEBPORTS".into())),
        );
        let from_web = ExtendedAccessList::default().with_line(
            permit(tcp(), AddressSpec::Any, AddressSpec::Any)
                .src_ports(PortMatch::Group("WEBPORTS".into())),
        );
        builder
            .define("TO-WEB", Structure::ExtendedAccessList(to_web), None)
            .unwrap();
        builder
            .define("FROM-WEB", Structure::ExtendedAccessList(from_web), None)
            .unwrap();
    });
    assert!(device.acls.contains_key(&canonical_name(StructureKind::PortObjectGroup, "WEBPORTS")));
    assert!(
        device
            .acls
            .contains_key(&canonical_name(StructureKind::SourcePortObjectGroup, "WEBPORTS"))
    );
    assert!(!device.unused.iter().any(|id| id.name == "WEBPORTS"));

    let env = packets(&device);
    let server = Ipv4Addr::new(10, 0, 0, 1);
    let request = Flow::tcp(CLIENT, server, 443);
    let reply = Flow {
        src_port: 8080,
        dst_port: 49152,
        ..Flow::tcp(server, CLIENT, 0)
    };
    assert_eq!(env.filter_named(&ext_acl("TO-WEB"), &request), LineAction::Permit);
    assert_eq!(env.filter_named(&ext_acl("TO-WEB"), &reply), LineAction::Deny);
    assert_eq!(env.filter_named(&ext_acl("FROM-WEB"), &reply), LineAction::Permit);
    assert_eq!(env.filter_named(&ext_acl("FROM-WEB"), &request), LineAction::Deny);
}

#[test]
#[traced_test]
fn bad_service_group_fails_alone() {
    let device = compile(|builder| {
        let untyped = ServiceObjectGroup::default()
            .with_line(ServiceGroupLine::PortObject(PortSpec::Eq(vec![22])));
        let typed = ServiceObjectGroup::typed([IpProtocol::TCP, IpProtocol::UDP])
            .with_line(ServiceGroupLine::PortObject(PortSpec::Eq(vec![53])));
        builder
            .define("BAD", Structure::ServiceObjectGroup(untyped), None)
            .unwrap();
        builder
            .define("DNS", Structure::ServiceObjectGroup(typed), None)
            .unwrap();
    });
    let bad = StructureId::new(StructureKind::ServiceObjectGroup, "BAD");
    assert!(matches!(device.failures[&bad], LowerError::Malformed(_)));
    assert!(!device.acls.contains_key(&canonical_name(bad.kind, &bad.name)));
    assert!(logs_contain("Failed to lower"));

    let env = packets(&device);
    let dns = canonical_name(StructureKind::ServiceObjectGroup, "DNS");
    let resolver = Ipv4Addr::new(9, 9, 9, 9);
    assert_eq!(env.filter_named(&dns, &Flow::udp(CLIENT, resolver, 53)), LineAction::Permit);
    assert_eq!(env.filter_named(&dns, &Flow::tcp(CLIENT, resolver, 53)), LineAction::Permit);
    assert_eq!(env.filter_named(&dns, &Flow::udp(CLIENT, resolver, 54)), LineAction::Deny);
}

#[test]
fn standard_acl_as_route_filter() {
    let device = compile(|builder| {
        let acl = StandardAccessList::default()
            .with_line(StandardAclLine::new(
                LineAction::Deny,
                AddressSpec::Wildcard(IpWildcard::new(
                    Ipv4Addr::new(10, 9, 0, 0),
                    Ipv4Addr::new(0, 0, 255, 255),
                )),
            ))
            .with_line(StandardAclLine::new(
                LineAction::Permit,
                AddressSpec::Subnet(net("10.0.0.0/8")),
            ))
            .with_line(
                StandardAclLine::new(
                    LineAction::Permit,
                    AddressSpec::Range {
                        first: v4("192.168.0.1"),
                        last: v4("192.168.0.7"),
                    },
                )
                .text("permit range"),
            );
        builder
            .define("10", Structure::StandardAccessList(acl), None)
            .unwrap();
    });
    let name = canonical_name(StructureKind::StandardAccessList, "10");
    let filter = &device.route_filters[&name];
    assert_eq!(filter.lines.len(), 2);
    assert_eq!(filter.action_for(&net("10.1.0.0/16")), Some(LineAction::Permit));
    assert_eq!(filter.action_for(&net("10.9.1.0/24")), Some(LineAction::Deny));
    assert_eq!(filter.action_for(&net("192.168.0.0/24")), None);
    assert!(device.diagnostics.has(WarningKind::Unsupported));

    // the packet view keeps every line
    let env = packets(&device);
    let flow = |src: &str| Flow::tcp(src.parse().unwrap(), CLIENT, 22);
    assert_eq!(env.filter_named(&name, &flow("10.3.3.3")), LineAction::Permit);
    assert_eq!(env.filter_named(&name, &flow("10.9.3.3")), LineAction::Deny);
    assert_eq!(env.filter_named(&name, &flow("192.168.0.5")), LineAction::Permit);
}
