use stacked_errors::{bail, Result, StackableErr};

/// Returns the `index`th `/`-separated segment of `resource`.
///
///```
/// use fargate_exec::arn::segment;
///
/// let arn = "arn:aws:ecs:ap-northeast-1:123456789012:service/app-1/web";
/// assert_eq!(segment(arn, 1).unwrap(), "app-1");
/// assert_eq!(segment(arn, 2).unwrap(), "web");
/// assert!(segment(arn, 3).is_err());
/// ```
pub fn segment(resource: &str, index: usize) -> Result<&str> {
    resource.split('/').nth(index).stack_err_with(|| {
        format!("segment(resource: {resource:?}, index: {index}) -> not enough segments")
    })
}

/// Returns everything after the last `/`, or the whole input if there is no
/// `/`
pub fn last_segment(resource: &str) -> &str {
    match resource.rfind('/') {
        Some(i) => &resource[(i + 1)..],
        None => resource,
    }
}

/// Returns the last `n` `/`-separated segments joined back together with `/`
///
///```
/// use fargate_exec::arn::last_segments;
///
/// let arn = "arn:aws:ecs:us-east-1:123456789012:task/app-1/0123456789abcdef";
/// assert_eq!(last_segments(arn, 2).unwrap(), "app-1/0123456789abcdef");
/// assert_eq!(last_segments(arn, 1).unwrap(), "0123456789abcdef");
/// ```
pub fn last_segments(resource: &str, n: usize) -> Result<&str> {
    if n == 0 {
        bail!("last_segments(resource: {resource:?}, n: 0) -> `n` must be nonzero")
    }
    // walk backwards over `n` separators, the start is after the `n`th one
    let mut start = resource.len();
    for found in 0..n {
        match resource[..start].rfind('/') {
            Some(i) => {
                if found + 1 == n {
                    return Ok(&resource[(i + 1)..])
                }
                start = i;
            }
            None => {
                if found + 1 == n {
                    return Ok(resource)
                }
                break
            }
        }
    }
    bail!("last_segments(resource: {resource:?}, n: {n}) -> not enough segments")
}

/// The name of a cluster from its ARN, which is the segment after
/// `:cluster/`
pub fn cluster_name(cluster_arn: &str) -> Result<&str> {
    let name = segment(cluster_arn, 1).stack_err("cluster_name -> not a cluster ARN")?;
    if name.is_empty() {
        bail!("cluster_name(cluster_arn: {cluster_arn:?}) -> empty cluster name")
    }
    Ok(name)
}

/// The name of a service from its ARN. Both the old
/// `service/{name}` and the new `service/{cluster}/{name}` formats end with
/// the name.
pub fn service_name(service_arn: &str) -> &str {
    last_segment(service_arn)
}
