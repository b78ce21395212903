mod dns_record_provisioner;
mod route_provisioner;

pub use dns_record_provisioner::DnsRecordProvisioner;
pub use route_provisioner::RouteProvisioner;
