use strata_core::{PointInfo, ServiceInfo, TagId};

const SERVICES: &[(&str, &str, &str)] = &[
    ("MDSSCSC1.ANVCALC", "Calculation Service", "SSERVER"),
    ("MDSSCSC1.SCADA", "SCADA Service", "SCADA"),
];

// (tag, description, units)
const POINTS: &[(&str, &str, Option<&str>)] = &[
    ("MDSSCSC1.ANVCALC.ADE1CA02", "ADE1 Percent Load", Some("%")),
    ("MDSSCSC1.ANVCALC.ADE1CA03", "ADE1 Inlet Flow", Some("m3/h")),
    ("MDSSCSC1.ANVCALC.ADE1SP01", "ADE1 Load Setpoint", Some("%")),
    ("MDSSCSC1.ANVCALC.ADE1.STATE", "ADE1 Run State", None),
    ("MDSSCSC1.SCADA.PUMP01", "Pump 01 Speed", Some("rpm")),
    ("MDSSCSC1.SCADA.FAIL", "Faulted telemetry link", None),
    ("MDSSCSC1.SCADA.TIMEOUT", "Slow telemetry link", None),
];

pub fn services() -> Vec<ServiceInfo> {
    SERVICES
        .iter()
        .map(|(name, description, kind)| ServiceInfo {
            name: (*name).to_string(),
            description: (*description).to_string(),
            kind: (*kind).to_string(),
        })
        .collect()
}

pub fn has_service(site_service: &str) -> bool {
    SERVICES.iter().any(|(name, _, _)| *name == site_service)
}

pub fn point(tag: &TagId) -> Option<PointInfo> {
    POINTS
        .iter()
        .find(|(name, _, _)| *name == tag.as_str())
        .map(|(_, description, units)| PointInfo {
            tag: tag.clone(),
            description: Some((*description).to_string()),
            units: units.map(str::to_string),
        })
}

pub fn points_on(site_service: &str) -> Vec<PointInfo> {
    POINTS
        .iter()
        .filter_map(|(name, _, _)| TagId::parse(*name).ok())
        .filter(|tag| tag.site_service() == site_service)
        .filter_map(|tag| point(&tag))
        .collect()
}
