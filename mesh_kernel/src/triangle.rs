use crate::Pos;

// "Closest Point on Triangle to Point" from Real-Time Collision Detection by Christer Ericson
pub fn closest_point(v0: Pos, v1: Pos, v2: Pos, point: Pos) -> Pos {
    let ab = v1 - v0;
    let ac = v2 - v0;
    let bc = v2 - v1;

    // Compute parametric position s for projection P’ of P on AB,
    let snom = (point - v0).dot(&ab);
    let sdenom = (point - v1).dot(&(v0 - v1));

    // Compute parametric position t for projection P’ of P on AC,
    let tnom = (point - v0).dot(&ac);
    let tdenom = (point - v2).dot(&(v0 - v2));
    if snom <= 0.0 && tnom <= 0.0 {
        return v0;
    }

    // Compute parametric position u for projection P’ of P on BC,
    let unom = (point - v1).dot(&bc);
    if sdenom <= 0.0 && unom <= 0.0 {
        return v1;
    }

    let udenom = (point - v2).dot(&(v1 - v2));
    if tdenom <= 0.0 && udenom <= 0.0 {
        return v2;
    }

    // P is outside (or on) AB if the triple scalar product [N PA PB] <= 0
    let n = (v1 - v0).cross(&(v2 - v0));
    let vc = n.dot(&(v0 - point).cross(&(v1 - point)));

    // If P outside AB and within feature region of AB, return projection of P onto AB
    if vc <= 0.0 && snom >= 0.0 && sdenom >= 0.0 {
        return v0 + snom / (snom + sdenom) * ab;
    }

    // P is outside (or on) BC if the triple scalar product [N PB PC] <= 0
    // If P outside BC and within feature region of BC, return projection of P onto BC
    let va = n.dot(&(v1 - point).cross(&(v2 - point)));
    if va <= 0.0 && unom >= 0.0 && udenom >= 0.0 {
        return v1 + unom / (unom + udenom) * bc;
    }

    // P is outside (or on) CA if the triple scalar product [N PC PA] <= 0
    // If P outside CA and within feature region of CA, return projection of P onto CA
    let vb = n.dot(&(v2 - point).cross(&(v0 - point)));
    if vb <= 0.0 && tnom >= 0.0 && tdenom >= 0.0 {
        return v0 + tnom / (tnom + tdenom) * ac;
    }

    // P must project inside face region. Compute Q using barycentric coordinates
    let u = va / (va + vb + vc);
    let v = vb / (va + vb + vc);
    let w = 1.0 - u - v;

    u * v0 + v * v1 + w * v2
}

/// Barycentric coordinates of a point with respect to a triangle. The point is
/// assumed to lie in (or be projected onto) the triangle's plane.
pub fn barycentric(v0: Pos, v1: Pos, v2: Pos, point: Pos) -> [f32; 3] {
    let ab = v1 - v0;
    let ac = v2 - v0;
    let ap = point - v0;

    let d00 = ab.dot(&ab);
    let d01 = ab.dot(&ac);
    let d11 = ac.dot(&ac);
    let d20 = ap.dot(&ab);
    let d21 = ap.dot(&ac);

    let denom = d00 * d11 - d01 * d01;
    if denom.abs() <= f32::EPSILON {
        // Degenerate triangle, weight everything on the first vertex.
        return [1.0, 0.0, 0.0];
    }

    let v = (d11 * d20 - d01 * d21) / denom;
    let w = (d00 * d21 - d01 * d20) / denom;
    [1.0 - v - w, v, w]
}

#[cfg(test)]
mod tests {
    use nalgebra::Vector3;

    use super::{barycentric, closest_point};

    fn triangle() -> (Vector3<f32>, Vector3<f32>, Vector3<f32>) {
        (
            Vector3::zeros(),
            Vector3::new(2.0, 0.0, 0.0),
            Vector3::new(0.0, 2.0, 0.0),
        )
    }

    #[test]
    fn closest_point_inside_projects_onto_plane() {
        let (v0, v1, v2) = triangle();
        let closest = closest_point(v0, v1, v2, Vector3::new(0.5, 0.5, 3.0));
        assert!((closest - Vector3::new(0.5, 0.5, 0.0)).norm() < 1e-6);
    }

    #[test]
    fn closest_point_clamps_to_vertex_and_edge() {
        let (v0, v1, v2) = triangle();

        let at_vertex = closest_point(v0, v1, v2, Vector3::new(-1.0, -1.0, 0.0));
        assert!((at_vertex - v0).norm() < 1e-6);

        let on_edge = closest_point(v0, v1, v2, Vector3::new(1.0, -2.0, 0.0));
        assert!((on_edge - Vector3::new(1.0, 0.0, 0.0)).norm() < 1e-6);
    }

    #[test]
    fn barycentric_weights_sum_to_one() {
        let (v0, v1, v2) = triangle();

        assert_eq!(barycentric(v0, v1, v2, v0), [1.0, 0.0, 0.0]);
        assert_eq!(barycentric(v0, v1, v2, v1), [0.0, 1.0, 0.0]);

        let [u, v, w] = barycentric(v0, v1, v2, Vector3::new(0.5, 0.5, 0.0));
        assert!((u + v + w - 1.0).abs() < 1e-6);
        assert!(u > 0.0 && v > 0.0 && w > 0.0);
    }
}
