// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Module that implements Display for canonical objects

use crate::aspath::{AsPathMatch, AsRange};
use crate::community::{CommunityMatch, CommunitySetExpr, HalfMatch};
use crate::ipspace::{IpSpace, IpWildcard};
use crate::packet::{
    AclLine, HeaderSpace, IpAccessList, IpProtocol, LineAction, MatchExpr, PortRange,
};
use crate::policy::{BooleanExpr, LongExpr, RoutingPolicy, Statement};
use crate::routefilter::{RouteFilterLine, RouteFilterList};
use std::fmt::{Display, Formatter, Result};

fn join<T: Display>(f: &mut Formatter<'_>, items: &[T], sep: &str) -> Result {
    for (n, item) in items.iter().enumerate() {
        if n > 0 {
            write!(f, "{sep}")?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}

impl Display for IpWildcard {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        match self.as_prefix() {
            Some(prefix) => write!(f, "{prefix}"),
            None => write!(f, "{}:{}", self.ip, self.wildcard),
        }
    }
}

impl Display for IpSpace {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        match self {
            IpSpace::Empty => write!(f, "none"),
            IpSpace::Universe => write!(f, "any"),
            IpSpace::Prefix(p) => write!(f, "{p}"),
            IpSpace::Wildcard(w) => write!(f, "{w}"),
            IpSpace::Range { first, last } => write!(f, "{first}-{last}"),
            IpSpace::Reference(name) => write!(f, "${name}"),
            IpSpace::Union(members) => {
                write!(f, "{{")?;
                join(f, members, ", ")?;
                write!(f, "}}")
            }
        }
    }
}

impl Display for IpProtocol {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        match *self {
            IpProtocol::ICMP => write!(f, "icmp"),
            IpProtocol::TCP => write!(f, "tcp"),
            IpProtocol::UDP => write!(f, "udp"),
            IpProtocol::ICMPV6 => write!(f, "icmpv6"),
            IpProtocol(n) => write!(f, "proto-{n}"),
        }
    }
}

impl Display for PortRange {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        if self.start() == self.end() {
            write!(f, "{}", self.start())
        } else {
            write!(f, "{}-{}", self.start(), self.end())
        }
    }
}

impl Display for LineAction {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        match self {
            LineAction::Permit => write!(f, "permit"),
            LineAction::Deny => write!(f, "deny"),
        }
    }
}

impl Display for HeaderSpace {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        write!(f, "[")?;
        let mut sep = "";
        if !self.protocols.is_empty() {
            write!(f, "proto ")?;
            join(f, &self.protocols, "|")?;
            sep = " ";
        }
        if let Some(src) = &self.src_ips {
            write!(f, "{sep}src {src}")?;
            sep = " ";
        }
        if !self.src_ports.is_empty() {
            write!(f, "{sep}sport ")?;
            join(f, &self.src_ports, ",")?;
            sep = " ";
        }
        if let Some(dst) = &self.dst_ips {
            write!(f, "{sep}dst {dst}")?;
            sep = " ";
        }
        if !self.dst_ports.is_empty() {
            write!(f, "{sep}dport ")?;
            join(f, &self.dst_ports, ",")?;
            sep = " ";
        }
        if !self.icmp_types.is_empty() {
            write!(f, "{sep}icmp-type ")?;
            join(f, &self.icmp_types, ",")?;
            sep = " ";
        }
        if !self.icmp_codes.is_empty() {
            write!(f, "{sep}icmp-code ")?;
            join(f, &self.icmp_codes, ",")?;
        }
        write!(f, "]")
    }
}

impl Display for MatchExpr {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        match self {
            MatchExpr::True => write!(f, "true"),
            MatchExpr::False => write!(f, "false"),
            MatchExpr::Header(hs) => write!(f, "{hs}"),
            MatchExpr::PermittedByAcl(name) => write!(f, "acl({name})"),
            MatchExpr::And(v) => {
                write!(f, "(")?;
                join(f, v, " and ")?;
                write!(f, ")")
            }
            MatchExpr::Or(v) => {
                write!(f, "(")?;
                join(f, v, " or ")?;
                write!(f, ")")
            }
            MatchExpr::Not(e) => write!(f, "not {e}"),
        }
    }
}

impl Display for AclLine {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        write!(f, "{} {}", self.action, self.expr)
    }
}

impl Display for IpAccessList {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        write!(f, "acl {}", self.name)?;
        if let Some(source) = &self.source_name {
            write!(f, " (from {source})")?;
        }
        writeln!(f)?;
        for line in &self.lines {
            writeln!(f, "  {line}")?;
        }
        Ok(())
    }
}

impl Display for RouteFilterLine {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        write!(f, "{} {}", self.action, self.prefix)?;
        if self.min_len() != self.prefix.prefix_len() || self.max_len() != self.prefix.prefix_len()
        {
            write!(f, " len {}-{}", self.min_len(), self.max_len())?;
        }
        Ok(())
    }
}

impl Display for RouteFilterList {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        writeln!(f, "route-filter {}", self.name)?;
        for line in &self.lines {
            writeln!(f, "  {line}")?;
        }
        Ok(())
    }
}

impl Display for HalfMatch {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        match self {
            HalfMatch::Literal(v) => write!(f, "{v}"),
            HalfMatch::Range(lo, hi) => write!(f, "[{lo}..{hi}]"),
            HalfMatch::Var(name) => write!(f, "${name}"),
            HalfMatch::Any => write!(f, "*"),
        }
    }
}

impl Display for CommunityMatch {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        write!(f, "{}:{}", self.high, self.low)
    }
}

impl Display for CommunitySetExpr {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        match self {
            CommunitySetExpr::Inline(v) => {
                write!(f, "(")?;
                join(f, v, ", ")?;
                write!(f, ")")
            }
            CommunitySetExpr::Reference(name) => write!(f, "${name}"),
        }
    }
}

impl Display for AsRange {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        if self.lo() == self.hi() {
            write!(f, "{}", self.lo())
        } else {
            write!(f, "[{}..{}]", self.lo(), self.hi())
        }
    }
}

impl Display for AsPathMatch {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        let (what, ranges, exact) = match self {
            AsPathMatch::OriginatesFrom { ranges, exact } => ("originates-from", ranges, exact),
            AsPathMatch::PassesThrough { ranges, exact } => ("passes-through", ranges, exact),
            AsPathMatch::NeighborIs { ranges, exact } => ("neighbor-is", ranges, exact),
            AsPathMatch::Reference(name) => return write!(f, "as-path ${name}"),
        };
        write!(f, "as-path {what} ")?;
        join(f, ranges, ",")?;
        if *exact {
            write!(f, " exact")?;
        }
        Ok(())
    }
}

impl Display for LongExpr {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        match self {
            LongExpr::Literal(v) => write!(f, "{v}"),
            LongExpr::Var(name) => write!(f, "${name}"),
            LongExpr::Increment(v) => write!(f, "+{v}"),
            LongExpr::Decrement(v) => write!(f, "-{v}"),
        }
    }
}

impl Display for BooleanExpr {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        match self {
            BooleanExpr::True => write!(f, "true"),
            BooleanExpr::False => write!(f, "false"),
            BooleanExpr::And(v) => {
                write!(f, "(")?;
                join(f, v, " and ")?;
                write!(f, ")")
            }
            BooleanExpr::Or(v) => {
                write!(f, "(")?;
                join(f, v, " or ")?;
                write!(f, ")")
            }
            BooleanExpr::Not(e) => write!(f, "not {e}"),
            BooleanExpr::Call(name) => write!(f, "call {name}"),
            BooleanExpr::MatchAsPath(m) => write!(f, "{m}"),
            BooleanExpr::MatchCommunities(sem, set) => write!(f, "community {sem:?} {set}"),
            BooleanExpr::MatchLocalPreference(c) => {
                write!(f, "local-preference {:?} {}", c.cmp, c.value)
            }
            BooleanExpr::MatchMetric(c) => write!(f, "metric {:?} {}", c.cmp, c.value),
            BooleanExpr::MatchTag(c) => write!(f, "tag {:?} {}", c.cmp, c.value),
            BooleanExpr::MatchRouteType(t) => write!(f, "route-type {t:?}"),
            BooleanExpr::MatchNeighborIp(ip) => write!(f, "neighbor {ip}"),
            BooleanExpr::MatchPrefixSet(field, name) => write!(f, "{field:?} in ${name}"),
            BooleanExpr::MatchProtocol(protocols) => write!(f, "protocol {protocols:?}"),
        }
    }
}

fn fmt_statements(f: &mut Formatter<'_>, stmts: &[Statement], depth: usize) -> Result {
    let indent = "  ".repeat(depth);
    for stmt in stmts {
        match stmt {
            Statement::If(i) => {
                if let Some(comment) = &i.comment {
                    writeln!(f, "{indent}# {comment}")?;
                }
                writeln!(f, "{indent}if {} then", i.guard)?;
                fmt_statements(f, &i.then, depth + 1)?;
                if !i.otherwise.is_empty() {
                    writeln!(f, "{indent}else")?;
                    fmt_statements(f, &i.otherwise, depth + 1)?;
                }
                writeln!(f, "{indent}endif")?;
            }
            Statement::Call(name) => writeln!(f, "{indent}call {name}")?,
            Statement::SetCommunities(set) => writeln!(f, "{indent}set community {set}")?,
            Statement::AddCommunities(set) => writeln!(f, "{indent}add community {set}")?,
            Statement::DeleteCommunities(set) => writeln!(f, "{indent}delete community {set}")?,
            Statement::SetLocalPreference(v) => writeln!(f, "{indent}set local-preference {v}")?,
            Statement::SetMetric(v) => writeln!(f, "{indent}set metric {v}")?,
            Statement::SetTag(v) => writeln!(f, "{indent}set tag {v}")?,
            Statement::SetWeight(v) => writeln!(f, "{indent}set weight {v}")?,
            other => writeln!(f, "{indent}{other:?}")?,
        }
    }
    Ok(())
}

impl Display for RoutingPolicy {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        writeln!(f, "policy {}", self.name)?;
        fmt_statements(f, &self.statements, 1)
    }
}
